// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interface for measuring the frequency of internal clock signals.
//!
//! Some SoCs route their internal clocks through a shared frequency counter
//! so software can check that PLLs and clock muxes produced the expected
//! rates. A chip driver for such a counter implements [`ClockMeasure`]; a
//! capsule presents the registered sources to the outside world.

use crate::ErrorCode;

/// One clock signal that can be routed to the counter.
///
/// Identifiers are small and sparse: a chip only lists the slots that are
/// wired to a real signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSource {
    /// Value programmed into the counter's source-select field.
    pub id: u8,
    /// Human readable name, unique within a table.
    pub name: &'static str,
}

impl ClockSource {
    pub const fn new(id: u8, name: &'static str) -> ClockSource {
        ClockSource { id, name }
    }
}

/// A frequency counter shared by a fixed table of clock sources.
///
/// Measurements are synchronous: `measure` returns once the counter's gate
/// window has closed or the hardware timed out. Implementations serialize
/// concurrent callers internally.
pub trait ClockMeasure {
    /// Every source that may be measured, in ascending identifier order.
    fn sources(&self) -> &[ClockSource];

    /// Measure the source with identifier `id` and return its rate in Hz.
    ///
    /// Returns `INVAL` if `id` is not in [`ClockMeasure::sources`] and
    /// `TIMEOUT` if the counter never finished its gate window.
    fn measure(&self, id: u8) -> Result<u32, ErrorCode>;

    /// Look up a registered source by name.
    fn find(&self, name: &str) -> Option<ClockSource> {
        self.sources().iter().find(|s| s.name == name).copied()
    }

    /// Resolve `name` and measure it.
    ///
    /// Unknown names return `NODEVICE` without touching the hardware.
    fn measure_by_name(&self, name: &str) -> Result<u32, ErrorCode> {
        let source = self.find(name).ok_or(ErrorCode::NODEVICE)?;
        self.measure(source.id)
    }
}
