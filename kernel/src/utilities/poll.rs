// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Bounded polling of hardware status.

use crate::hil::time::Delay;
use crate::ErrorCode;

/// Read a value until `cond` holds or `timeout_us` has elapsed.
///
/// Each round reads once and tests the value. Between rounds the caller is
/// put to sleep for `interval_us` through `delay`, so the bus is sampled at
/// most once per interval. Elapsed time is the sum of the requested sleeps.
/// Once it exceeds `timeout_us` the value is read and tested one last time,
/// so a condition that became true during the final sleep is not reported
/// as a timeout.
///
/// Returns the last value read if `cond` held, `TIMEOUT` otherwise. An
/// `interval_us` of zero polls without sleeping and counts each round as one
/// microsecond.
pub fn read_poll_timeout<D, R, C>(
    mut read: R,
    cond: C,
    delay: &D,
    interval_us: u32,
    timeout_us: u32,
) -> Result<u32, ErrorCode>
where
    D: Delay + ?Sized,
    R: FnMut() -> u32,
    C: Fn(u32) -> bool,
{
    let step = u64::from(interval_us.max(1));
    let timeout = u64::from(timeout_us);
    // Wide enough that it cannot saturate before passing any `u32` timeout.
    let mut elapsed: u64 = 0;

    loop {
        let val = read();
        if cond(val) {
            return Ok(val);
        }
        if elapsed > timeout {
            let val = read();
            return if cond(val) {
                Ok(val)
            } else {
                Err(ErrorCode::TIMEOUT)
            };
        }
        if interval_us > 0 {
            delay.delay_us(interval_us);
        }
        elapsed = elapsed.saturating_add(step);
    }
}
