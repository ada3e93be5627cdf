// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2023.

//! Read-only view of a clock measurement block.
//!
//! Every source registered with a [`hil::clock_measure::ClockMeasure`]
//! implementation is published as one entry in a named directory. Reading
//! an entry runs a fresh measurement and renders the rate in Hz as a
//! decimal integer followed by a newline. Nothing is cached and there is no
//! write path.
//!
//! A `summary` read measures every source in table order and renders a
//! table with one row per source.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let dir = ClockMeasureDirectory::new(meson_gx::clk_msr::DIRECTORY_NAME, &clk_msr);
//! let mut buf = [0; 16];
//! let len = dir.read("clk81", &mut buf)?;
//! // buf[..len] == b"166000000\n"
//! ```

use core::fmt::{self, Write};

use kernel::hil;
use kernel::hil::clock_measure::ClockSource;
use kernel::ErrorCode;

/// Permission bits of every entry: readable by everyone, writable by no
/// one.
pub const MODE: u16 = 0o444;

/// Name of the entry that renders every source at once.
pub const SUMMARY_NAME: &str = "measure_summary";

const NAME_WIDTH: usize = 20;
const RATE_WIDTH: usize = 12;

/// `core::fmt::Write` over a fixed buffer. Fails once the buffer is full.
struct BufferWriter<'b> {
    buf: &'b mut [u8],
    size: usize,
}

impl<'b> BufferWriter<'b> {
    fn new(buf: &'b mut [u8]) -> BufferWriter<'b> {
        BufferWriter { buf, size: 0 }
    }
}

impl Write for BufferWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let end = self.size + bytes.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.size..end].copy_from_slice(bytes);
        self.size = end;
        Ok(())
    }
}

/// One published source.
pub struct ClockMeasureEntry<'a, M: hil::clock_measure::ClockMeasure> {
    source: ClockSource,
    measure: &'a M,
}

impl<M: hil::clock_measure::ClockMeasure> Clone for ClockMeasureEntry<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: hil::clock_measure::ClockMeasure> Copy for ClockMeasureEntry<'_, M> {}

impl<'a, M: hil::clock_measure::ClockMeasure> ClockMeasureEntry<'a, M> {
    pub fn name(&self) -> &'static str {
        self.source.name
    }

    pub fn source(&self) -> ClockSource {
        self.source
    }

    pub fn mode(&self) -> u16 {
        MODE
    }

    /// Measure the source and render `"<hz>\n"` into `buf`.
    ///
    /// Returns the number of bytes written. Measurement errors are passed
    /// through unchanged; `SIZE` means `buf` is too short.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, ErrorCode> {
        let hz = self.measure.measure(self.source.id)?;
        let mut writer = BufferWriter::new(buf);
        writeln!(writer, "{}", hz)?;
        Ok(writer.size)
    }
}

/// Directory of entries, one per registered source.
pub struct ClockMeasureDirectory<'a, M: hil::clock_measure::ClockMeasure> {
    name: &'static str,
    measure: &'a M,
}

impl<'a, M: hil::clock_measure::ClockMeasure> ClockMeasureDirectory<'a, M> {
    pub fn new(name: &'static str, measure: &'a M) -> ClockMeasureDirectory<'a, M> {
        ClockMeasureDirectory { name, measure }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Name of the entry that renders [`ClockMeasureDirectory::summary`].
    pub fn summary_name(&self) -> &'static str {
        SUMMARY_NAME
    }

    /// Every readable name: the sources in table order, then the summary.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + 'a {
        self.entries()
            .map(|entry| entry.name())
            .chain(core::iter::once(SUMMARY_NAME))
    }

    /// Entries in source table order.
    pub fn entries(&self) -> impl Iterator<Item = ClockMeasureEntry<'a, M>> + 'a {
        let measure = self.measure;
        measure
            .sources()
            .iter()
            .map(move |source| ClockMeasureEntry {
                source: *source,
                measure,
            })
    }

    /// Entry called `name`, or `NODEVICE`. Does not access the hardware.
    pub fn lookup(&self, name: &str) -> Result<ClockMeasureEntry<'a, M>, ErrorCode> {
        self.measure
            .find(name)
            .map(|source| ClockMeasureEntry {
                source,
                measure: self.measure,
            })
            .ok_or(ErrorCode::NODEVICE)
    }

    /// Look up `name` and read it into `buf`. [`SUMMARY_NAME`] reads the
    /// summary.
    pub fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize, ErrorCode> {
        if name == SUMMARY_NAME {
            return self.summary(buf);
        }
        self.lookup(name)?.read(buf)
    }

    /// Measure every source and render one row per source into `buf`.
    ///
    /// The first failed measurement aborts the summary and is returned.
    pub fn summary(&self, buf: &mut [u8]) -> Result<usize, ErrorCode> {
        let mut writer = BufferWriter::new(buf);
        writeln!(
            writer,
            "{:<name_w$} {:>rate_w$}",
            "clock",
            "rate",
            name_w = NAME_WIDTH,
            rate_w = RATE_WIDTH
        )?;
        for _ in 0..NAME_WIDTH + 1 + RATE_WIDTH {
            writer.write_char('-')?;
        }
        writer.write_char('\n')?;

        for entry in self.entries() {
            let hz = self.measure.measure(entry.source.id)?;
            writeln!(
                writer,
                "{:<name_w$} {:>rate_w$}",
                entry.name(),
                hz,
                name_w = NAME_WIDTH,
                rate_w = RATE_WIDTH
            )?;
        }
        Ok(writer.size)
    }
}
