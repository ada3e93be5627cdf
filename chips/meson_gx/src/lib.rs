// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Peripheral drivers for the Amlogic Meson GX family (S905, S905X, S912).

#![cfg_attr(not(test), no_std)]
#![crate_name = "meson_gx"]
#![crate_type = "rlib"]

pub mod clk_msr;
pub mod clk_msr_sources;

#[cfg(test)]
mod test;
