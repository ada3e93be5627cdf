// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Standard error enum for invoking operations

use core::fmt;

/// Standard errors.
///
/// Every fallible operation in the workspace returns `Result<_, ErrorCode>`.
/// The numeric values are stable so a presentation layer can forward them
/// as status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ErrorCode {
    /// An invalid parameter was passed
    INVAL = 6,
    /// Parameter passed was too large
    SIZE = 7,
    /// Device does not exist
    NODEVICE = 11,
    /// Hardware did not reach the expected state within its time bound
    TIMEOUT = 14,
}

impl From<ErrorCode> for usize {
    fn from(err: ErrorCode) -> usize {
        err as usize
    }
}

impl From<fmt::Error> for ErrorCode {
    /// Formatting into a fixed buffer only fails when the buffer is full.
    fn from(_: fmt::Error) -> ErrorCode {
        ErrorCode::SIZE
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ErrorCode::INVAL => "invalid argument",
            ErrorCode::SIZE => "size too large",
            ErrorCode::NODEVICE => "no such device",
            ErrorCode::TIMEOUT => "timed out",
        };
        f.write_str(msg)
    }
}
