// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Memory Mapped I/O regions.
//!
//! Peripherals are modeled by two structures: a `#[repr(C)]` register block
//! declared with `register_structs!`, and a driver object holding a
//! [`StaticRef`] to that block. The address of the block usually comes from
//! the platform description as a base and a length. [`MmioRegion`] carries
//! that pair and checks it can actually hold the register block before a
//! driver is built on top of it:
//!
//! ```rust,ignore
//! let region = unsafe { MmioRegion::new(0xc110_8000, 0x10) };
//! let registers: StaticRef<MsrRegisters> = region.map()?;
//! ```

use core::mem::{align_of, size_of};

use crate::utilities::StaticRef;
use crate::ErrorCode;

/// A physical address range reserved for one peripheral.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MmioRegion {
    base: usize,
    len: usize,
}

impl MmioRegion {
    /// Describe the register range `[base, base + len)`.
    ///
    /// ## Safety
    ///
    /// The range must be device memory (or memory standing in for it) that
    /// stays valid for the rest of the program and that nothing else
    /// accesses through another reference.
    pub const unsafe fn new(base: usize, len: usize) -> MmioRegion {
        MmioRegion { base, len }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Map the region as a register block of type `T`.
    ///
    /// Fails with `NODEVICE` for a null base, `INVAL` for a base that is not
    /// aligned for `T`, and `SIZE` if the region is smaller than `T`.
    pub fn map<T>(&self) -> Result<StaticRef<T>, ErrorCode> {
        if self.base == 0 {
            return Err(ErrorCode::NODEVICE);
        }
        if self.base % align_of::<T>() != 0 {
            return Err(ErrorCode::INVAL);
        }
        if self.len < size_of::<T>() {
            return Err(ErrorCode::SIZE);
        }
        // SAFETY: `new` requires the range to be valid and unaliased for the
        // rest of the program, and it was checked to fit a `T`.
        Ok(unsafe { StaticRef::new(self.base as *const T) })
    }
}
