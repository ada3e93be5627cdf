// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Core kernel crate.
//!
//! Holds the code that chips and capsules share: the workspace-wide
//! [`ErrorCode`], compile-time configuration, the Hardware Interface Layer
//! (HIL) traits, and MMIO utilities.
//!
//! Most `unsafe` code is in this kernel crate.

#![cfg_attr(not(test), no_std)]
#![warn(unreachable_pub)]

pub mod config;
pub mod errorcode;
pub mod hil;
pub mod utilities;

pub use crate::errorcode::ErrorCode;
