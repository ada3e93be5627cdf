// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Data structure for storing compile-time configuration options.
//!
//! Configuration lives in a `const` object rather than behind `#[cfg]`
//! attributes so that every code path is type-checked, even the disabled
//! ones. After type-checking, the compiler folds the constants and removes
//! the dead branches, so a disabled option costs nothing in the final image.

/// Data structure holding compile-time configuration options.
///
/// To change the configuration, enable the matching cargo feature of the
/// `kernel` crate.
pub struct Config {
    /// Whether every clock measurement should be traced to the log.
    ///
    /// If enabled, the measurement engine emits a `debug` record for each
    /// measured source with its raw count and converted rate.
    pub trace_clock_measure: bool,
}

/// The unique instance of `Config` where compile-time configuration options
/// are defined. This is the only location in the workspace where `#[cfg(x)]`
/// is used to configure code based on cargo features.
pub const CONFIG: Config = Config {
    trace_clock_measure: cfg!(feature = "trace_clock_measure"),
};
