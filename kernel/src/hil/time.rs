// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Hardware agnostic interfaces for waiting on hardware.

/// Blocking delay provider.
///
/// Drivers that have to wait for a hardware status bit use this to sleep
/// between samples instead of spinning on the bus. An implementation may
/// block the calling thread or busy-wait on a cycle counter, but it must
/// wait at least the requested time.
pub trait Delay {
    /// Wait for at least `us` microseconds.
    fn delay_us(&self, us: u32);
}

impl<D: Delay + ?Sized> Delay for &D {
    fn delay_us(&self, us: u32) {
        (**self).delay_us(us);
    }
}
