// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock measurement (MSR) block.
//!
//! The MSR block is a single gated frequency counter. Any one of up to 128
//! internal clock signals can be routed to it through the source-select
//! field of `MSR_CLK_REG0`; the counter then accumulates cycles of that
//! signal for a fixed gate window and latches the result in
//! `MSR_CLK_REG2`. With the 50 us gate used here the count reads as
//! MHz * 64.
//!
//! There is only one counter, so every measurement holds the register lock
//! from the first write to the final count read. Two sources measured from
//! different threads are fully serialized.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! let region = unsafe { MmioRegion::new(0xc110_875c, 0x10) };
//! let clk_msr = meson_gx::clk_msr::ClkMsr::attach(&region, &delay)?;
//! let clk81_hz = clk_msr.measure_by_name("clk81")?;
//! ```

use kernel::config::CONFIG;
use kernel::hil::clock_measure::{ClockMeasure, ClockSource};
use kernel::hil::time::Delay;
use kernel::utilities::mmio::MmioRegion;
use kernel::utilities::poll;
use kernel::utilities::registers::interfaces::{Readable, Writeable};
use kernel::utilities::registers::{
    register_bitfields, register_structs, LocalRegisterCopy, ReadWrite,
};
use kernel::utilities::StaticRef;
use kernel::ErrorCode;
use spin::Mutex;

use crate::clk_msr_sources::GX_CLK_MSR_SOURCES;

/// Name under which the per-source entries are published.
pub const DIRECTORY_NAME: &str = "meson-clk-msr";

/// Number of source-select slots.
pub const CLK_MSR_MAX: u8 = 128;

/// Gate divisor for a 50 us measurement window.
const DIV_50US: u32 = 64;

const POLL_INTERVAL_US: u32 = 10;
const POLL_TIMEOUT_US: u32 = 1000;

register_structs! {
    pub ClkMsrRegisters {
        /// Duty cycle measurement
        (0x00 => duty: ReadWrite<u32>),
        /// Gate control and status
        (0x04 => reg0: ReadWrite<u32, MSR_CLK_REG0::Register>),
        (0x08 => reg1: ReadWrite<u32>),
        /// Latched count
        (0x0C => reg2: ReadWrite<u32, MSR_CLK_REG2::Register>),
        (0x10 => @END),
    }
}

register_bitfields![u32,
    pub MSR_CLK_REG0 [
        /// Gate duration divisor
        CLK_DIV OFFSET(0) NUMBITS(16) [],
        ENABLE OFFSET(16) NUMBITS(1) [],
        /// Continuous measurement
        CONT OFFSET(17) NUMBITS(1) [],
        /// Interrupt on completion
        INTR OFFSET(18) NUMBITS(1) [],
        RUN OFFSET(19) NUMBITS(1) [],
        /// Source select
        CLK_SRC OFFSET(20) NUMBITS(7) [],
        /// Set while the gate window is open
        BUSY OFFSET(31) NUMBITS(1) []
    ],
    pub MSR_CLK_REG2 [
        VAL OFFSET(0) NUMBITS(16) []
    ]
];

/// Registers of the block, by offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum MsrRegister {
    Duty = 0x0,
    Reg0 = 0x4,
    Reg1 = 0x8,
    Reg2 = 0xc,
}

impl MsrRegister {
    pub const fn offset(self) -> usize {
        self as usize
    }
}

/// Word access to the MSR register block.
///
/// `update_bits` is a plain read-modify-write: callers serialize it. The
/// engine does so by keeping the implementation behind its lock.
pub trait ClkMsrRegisterInterface {
    fn read(&self, reg: MsrRegister) -> u32;

    fn write(&self, reg: MsrRegister, val: u32);

    /// Replace the bits of `reg` selected by `mask` with those of `val`.
    ///
    /// The write is skipped if the register already holds the result.
    fn update_bits(&self, reg: MsrRegister, mask: u32, val: u32) {
        let orig = self.read(reg);
        let tmp = (orig & !mask) | (val & mask);
        if tmp != orig {
            self.write(reg, tmp);
        }
    }

    /// Sample `reg` every `interval_us` until `cond` holds, for at most
    /// `timeout_us`. Returns the value that satisfied `cond`.
    fn poll_until<C, D>(
        &self,
        reg: MsrRegister,
        cond: C,
        interval_us: u32,
        timeout_us: u32,
        delay: &D,
    ) -> Result<u32, ErrorCode>
    where
        C: Fn(u32) -> bool,
        D: Delay + ?Sized,
    {
        poll::read_poll_timeout(|| self.read(reg), cond, delay, interval_us, timeout_us)
    }
}

/// The memory mapped register block.
pub struct MmioClkMsrRegisters {
    registers: StaticRef<ClkMsrRegisters>,
}

// SAFETY: the handle is the only reference to its register block and the
// engine only touches it while holding its lock.
unsafe impl Send for MmioClkMsrRegisters {}

impl MmioClkMsrRegisters {
    pub fn new(region: &MmioRegion) -> Result<MmioClkMsrRegisters, ErrorCode> {
        Ok(MmioClkMsrRegisters {
            registers: region.map()?,
        })
    }
}

impl ClkMsrRegisterInterface for MmioClkMsrRegisters {
    fn read(&self, reg: MsrRegister) -> u32 {
        match reg {
            MsrRegister::Duty => self.registers.duty.get(),
            MsrRegister::Reg0 => self.registers.reg0.get(),
            MsrRegister::Reg1 => self.registers.reg1.get(),
            MsrRegister::Reg2 => self.registers.reg2.get(),
        }
    }

    fn write(&self, reg: MsrRegister, val: u32) {
        match reg {
            MsrRegister::Duty => self.registers.duty.set(val),
            MsrRegister::Reg0 => self.registers.reg0.set(val),
            MsrRegister::Reg1 => self.registers.reg1.set(val),
            MsrRegister::Reg2 => self.registers.reg2.set(val),
        }
    }
}

/// Convert a latched count to Hz.
///
/// The count is MHz * 64. Adding 31 before the division rounds to the
/// nearest MHz; the 16-bit mask is applied before the division, so counts
/// within 31 of the field maximum wrap to 0 Hz.
pub fn raw_count_to_hz(raw: u32) -> u32 {
    let val_mask = MSR_CLK_REG2::VAL.mask << MSR_CLK_REG2::VAL.shift;
    ((raw.wrapping_add(31) & val_mask) / 64) * 1_000_000
}

/// Measurement engine for one MSR block.
///
/// The caller that owns the measurement sleeps through `Delay` while it
/// polls. Callers queued behind it do not sleep: they spin on the
/// `spin::Mutex` until the lock is released, which takes up to one poll
/// timeout (about 1 ms) per measurement ahead of them. Boards that must not
/// spin should serialize measurements before calling in.
pub struct ClkMsr<'a, R: ClkMsrRegisterInterface, D: Delay> {
    registers: Mutex<R>,
    delay: &'a D,
    sources: &'static [ClockSource],
}

impl<'a, D: Delay> ClkMsr<'a, MmioClkMsrRegisters, D> {
    /// Map the block at `region` and expose the GX source table.
    pub fn attach(
        region: &MmioRegion,
        delay: &'a D,
    ) -> Result<ClkMsr<'a, MmioClkMsrRegisters, D>, ErrorCode> {
        let registers = MmioClkMsrRegisters::new(region).map_err(|e| {
            log::error!(
                "{}: io resource mapping failed at {:#x}: {}",
                DIRECTORY_NAME,
                region.base(),
                e
            );
            e
        })?;

        log::info!(
            "{}: attached at {:#x}, {} sources",
            DIRECTORY_NAME,
            region.base(),
            GX_CLK_MSR_SOURCES.len()
        );

        Ok(ClkMsr::new(registers, delay, GX_CLK_MSR_SOURCES))
    }
}

impl<'a, R: ClkMsrRegisterInterface, D: Delay> ClkMsr<'a, R, D> {
    /// `sources` must be in strictly ascending id order, with every id
    /// below [`CLK_MSR_MAX`].
    pub fn new(registers: R, delay: &'a D, sources: &'static [ClockSource]) -> ClkMsr<'a, R, D> {
        debug_assert!(sources.windows(2).all(|w| w[0].id < w[1].id));
        debug_assert!(sources.iter().all(|s| s.id < CLK_MSR_MAX));

        ClkMsr {
            registers: Mutex::new(registers),
            delay,
            sources,
        }
    }

    /// Tear the engine down and hand back the register block.
    ///
    /// Taking `self` by value means no measurement can still be running.
    pub fn detach(self) -> R {
        self.registers.into_inner()
    }

    fn source(&self, id: u8) -> Option<&ClockSource> {
        self.sources
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|i| &self.sources[i])
    }

    /// Run one gate window on source `id`. The caller holds the lock.
    fn measure_locked(&self, regs: &R, id: u8) -> Result<u32, ErrorCode> {
        regs.write(MsrRegister::Reg0, 0);

        // Set measurement gate to 50us
        let div = MSR_CLK_REG0::CLK_DIV.val(DIV_50US);
        regs.update_bits(MsrRegister::Reg0, div.mask(), div.value);

        let src = MSR_CLK_REG0::CLK_SRC.val(id as u32);
        regs.update_bits(MsrRegister::Reg0, src.mask(), src.value);

        // Enable and start
        let start = MSR_CLK_REG0::RUN::SET + MSR_CLK_REG0::ENABLE::SET;
        regs.update_bits(MsrRegister::Reg0, start.mask(), start.value);

        let ret = regs.poll_until(
            MsrRegister::Reg0,
            |val| {
                !LocalRegisterCopy::<u32, MSR_CLK_REG0::Register>::new(val)
                    .is_set(MSR_CLK_REG0::BUSY)
            },
            POLL_INTERVAL_US,
            POLL_TIMEOUT_US,
            self.delay,
        );
        if let Err(e) = ret {
            // Do not leave the gate open until the next measurement.
            regs.write(MsrRegister::Reg0, 0);
            return Err(e);
        }

        // Stop counting, the count stays latched.
        let disable = MSR_CLK_REG0::ENABLE::CLEAR;
        regs.update_bits(MsrRegister::Reg0, disable.mask(), disable.value);

        let raw = regs.read(MsrRegister::Reg2);
        let hz = raw_count_to_hz(raw);
        if CONFIG.trace_clock_measure {
            log::debug!("{}: id {} raw {:#x} -> {} Hz", DIRECTORY_NAME, id, raw, hz);
        }
        Ok(hz)
    }
}

impl<'a, R: ClkMsrRegisterInterface, D: Delay> ClockMeasure for ClkMsr<'a, R, D> {
    fn sources(&self) -> &[ClockSource] {
        self.sources
    }

    fn measure(&self, id: u8) -> Result<u32, ErrorCode> {
        let source = *self.source(id).ok_or(ErrorCode::INVAL)?;

        let regs = self.registers.lock();
        let ret = self.measure_locked(&regs, source.id);
        drop(regs);

        if let Err(e) = ret {
            log::warn!("{}: measuring {} failed: {}", DIRECTORY_NAME, source.name, e);
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fake_msr::{Access, FakeDelay, FakeMsr};
    use std::thread;

    const CLK81: u8 = 7;
    const MALI: u8 = 35;

    const ENABLE: u32 = 1 << 16;
    const RUN: u32 = 1 << 19;

    fn src(id: u8) -> u32 {
        (id as u32) << 20
    }

    #[test]
    fn conversion_boundaries() {
        assert_eq!(raw_count_to_hz(0), 0);
        assert_eq!(raw_count_to_hz(32), 0);
        assert_eq!(raw_count_to_hz(33), 1_000_000);
        assert_eq!(raw_count_to_hz(64), 1_000_000);
        assert_eq!(raw_count_to_hz(95), 1_000_000);
        assert_eq!(raw_count_to_hz(97), 2_000_000);
        assert_eq!(raw_count_to_hz(6400), 100_000_000);
        assert_eq!(raw_count_to_hz(65_504), 1_023_000_000);
        assert_eq!(raw_count_to_hz(65_505), 0);
        // Wraps after rounding; the mask is applied before dividing.
        assert_eq!(raw_count_to_hz(65_535), 0);
    }

    #[test]
    fn conversion_ignores_bits_above_count() {
        assert_eq!(raw_count_to_hz(0xdead_0000 | 64), 1_000_000);
        assert_eq!(raw_count_to_hz(u32::MAX), 0);
    }

    #[test]
    fn end_to_end_preloaded_count() {
        let fake = FakeMsr::new();
        fake.preload(MsrRegister::Reg2, 95);
        fake.set_busy_reads(1);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.measure(CLK81), Ok(1_000_000));
        // Busy on the first sample, clear after one interval.
        assert_eq!(delay.calls(), 1);
        assert_eq!(delay.total_us(), 10);
    }

    #[test]
    fn protocol_order() {
        let fake = FakeMsr::new();
        fake.set_count(MALI, 6400);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.measure(MALI), Ok(100_000_000));

        let writes: Vec<_> = fake
            .log()
            .into_iter()
            .filter_map(|a| match a {
                Access::Write(reg, val) => Some((reg, val)),
                Access::Read(..) => None,
            })
            .collect();
        assert_eq!(
            writes,
            vec![
                (MsrRegister::Reg0, 0),
                (MsrRegister::Reg0, DIV_50US),
                (MsrRegister::Reg0, DIV_50US | src(MALI)),
                (MsrRegister::Reg0, DIV_50US | src(MALI) | ENABLE | RUN),
                (MsrRegister::Reg0, DIV_50US | src(MALI) | RUN),
            ]
        );

        // The count is read last, after the gate was stopped.
        let log = fake.log();
        assert_eq!(log.last(), Some(&Access::Read(MsrRegister::Reg2, 6400)));
        let busy_clear = log
            .iter()
            .position(|a| matches!(a, Access::Read(MsrRegister::Reg0, v) if v & (1 << 31) == 0 && v & RUN != 0))
            .unwrap();
        let count_read = log.len() - 1;
        assert!(busy_clear < count_read);
    }

    #[test]
    fn disabled_clock_reads_zero() {
        let fake = FakeMsr::new();
        fake.set_count(CLK81, 0);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake, &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.measure(CLK81), Ok(0));
    }

    #[test]
    fn timeout_skips_count_and_closes_gate() {
        let fake = FakeMsr::new();
        fake.set_stuck(true);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.measure(CLK81), Err(ErrorCode::TIMEOUT));

        let log = fake.log();
        assert!(!log
            .iter()
            .any(|a| matches!(a, Access::Read(MsrRegister::Reg2, _))));
        assert_eq!(log.last(), Some(&Access::Write(MsrRegister::Reg0, 0)));
        assert!(delay.total_us() > POLL_TIMEOUT_US);
        assert!(delay.total_us() <= POLL_TIMEOUT_US + POLL_INTERVAL_US);
    }

    #[test]
    fn recovers_after_timeout() {
        let fake = FakeMsr::new();
        fake.set_count(CLK81, 64);
        fake.set_stuck(true);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.measure(CLK81), Err(ErrorCode::TIMEOUT));
        fake.set_stuck(false);
        assert_eq!(clk_msr.measure(CLK81), Ok(1_000_000));
    }

    #[test]
    fn unknown_source_touches_nothing() {
        let fake = FakeMsr::new();
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(
            clk_msr.measure_by_name("not_a_clock"),
            Err(ErrorCode::NODEVICE)
        );
        // Slot 5 exists in the select field but is not wired.
        assert_eq!(clk_msr.measure(5), Err(ErrorCode::INVAL));
        assert_eq!(clk_msr.measure(CLK_MSR_MAX), Err(ErrorCode::INVAL));
        assert!(fake.log().is_empty());
        assert_eq!(delay.calls(), 0);
    }

    #[test]
    fn measure_by_name() {
        let fake = FakeMsr::new();
        fake.set_count(CLK81, 166 * 64);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake, &delay, GX_CLK_MSR_SOURCES);

        assert_eq!(clk_msr.find("clk81"), Some(ClockSource::new(CLK81, "clk81")));
        assert_eq!(clk_msr.measure_by_name("clk81"), Ok(166_000_000));
    }

    #[test]
    fn concurrent_measurements_are_serialized() {
        const ROUNDS: usize = 50;
        let ids = [CLK81, MALI, 46, 82];

        let fake = FakeMsr::new();
        for (i, id) in ids.iter().enumerate() {
            fake.set_count(*id, (i as u32 + 1) * 640);
        }
        fake.set_busy_reads(2);
        let delay = FakeDelay::yielding();
        let clk_msr = ClkMsr::new(fake.clone(), &delay, GX_CLK_MSR_SOURCES);

        thread::scope(|s| {
            for (i, id) in ids.iter().enumerate() {
                let clk_msr = &clk_msr;
                s.spawn(move || {
                    for _ in 0..ROUNDS {
                        let expected = (i as u32 + 1) * 10_000_000;
                        assert_eq!(clk_msr.measure(*id), Ok(expected));
                    }
                });
            }
        });

        // Split the access log into runs. Every run starts with the clearing
        // write and must program exactly one source before its count read.
        let log = fake.log();
        let mut runs = 0;
        let mut current: Option<u32> = None;
        for access in log {
            match access {
                Access::Write(MsrRegister::Reg0, 0) => {
                    assert_eq!(current, None, "run started inside another run");
                    current = Some(0);
                }
                Access::Write(MsrRegister::Reg0, val) => {
                    let sel = (val >> 20) & 0x7f;
                    let prev = current.expect("write outside a run");
                    if prev != 0 {
                        assert_eq!(prev, sel, "source changed mid-run");
                    }
                    current = Some(sel);
                }
                Access::Read(MsrRegister::Reg2, raw) => {
                    let sel = current.take().expect("count read outside a run");
                    let i = ids.iter().position(|id| *id as u32 == sel).unwrap();
                    assert_eq!(raw, (i as u32 + 1) * 640);
                    runs += 1;
                }
                _ => {}
            }
        }
        assert_eq!(runs, ROUNDS * ids.len());
    }

    #[test]
    fn detach_returns_registers() {
        let fake = FakeMsr::new();
        fake.set_count(CLK81, 64);
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::new(fake, &delay, GX_CLK_MSR_SOURCES);
        assert_eq!(clk_msr.measure(CLK81), Ok(1_000_000));

        let fake = clk_msr.detach();
        assert_eq!(
            fake.log().last(),
            Some(&Access::Read(MsrRegister::Reg2, 64))
        );
    }

    #[test]
    fn attach_rejects_unmapped_region() {
        let delay = FakeDelay::new();
        let region = unsafe { MmioRegion::new(0, 0x10) };
        assert_eq!(
            ClkMsr::attach(&region, &delay).err(),
            Some(ErrorCode::NODEVICE)
        );
        let region = unsafe { MmioRegion::new(0x1000, 0x8) };
        assert_eq!(ClkMsr::attach(&region, &delay).err(), Some(ErrorCode::SIZE));
    }

    #[test]
    fn attach_over_plain_memory() {
        // Plain memory never raises BUSY, so the poll succeeds at once and
        // the count reads back whatever was stored.
        let block: &'static mut [u32; 4] = Box::leak(Box::new([0, 0, 0, 95]));
        let base = block.as_mut_ptr() as usize;
        let region = unsafe { MmioRegion::new(base, 0x10) };
        let delay = FakeDelay::new();
        let clk_msr = ClkMsr::attach(&region, &delay).unwrap();

        assert_eq!(clk_msr.sources().len(), GX_CLK_MSR_SOURCES.len());
        assert_eq!(clk_msr.measure_by_name("clk81"), Ok(1_000_000));
        assert_eq!(delay.calls(), 0);

        let regs = clk_msr.detach();
        assert_eq!(
            regs.read(MsrRegister::Reg0),
            DIV_50US | src(CLK81) | RUN
        );
    }

    #[test]
    fn register_offsets() {
        assert_eq!(MsrRegister::Duty.offset(), 0x0);
        assert_eq!(MsrRegister::Reg0.offset(), 0x4);
        assert_eq!(MsrRegister::Reg1.offset(), 0x8);
        assert_eq!(MsrRegister::Reg2.offset(), 0xc);
        assert_eq!(core::mem::size_of::<ClkMsrRegisters>(), 0x10);
    }

    #[test]
    fn update_bits_preserves_other_bits() {
        let fake = FakeMsr::new();
        fake.preload(MsrRegister::Reg1, 0xffff_0000);
        fake.update_bits(MsrRegister::Reg1, 0x0000_00f0, 0x0000_0050);
        assert_eq!(fake.read(MsrRegister::Reg1), 0xffff_0050);

        // No write when nothing changes.
        let writes_before = fake
            .log()
            .iter()
            .filter(|a| matches!(a, Access::Write(..)))
            .count();
        fake.update_bits(MsrRegister::Reg1, 0x0000_00f0, 0x0000_0050);
        let writes_after = fake
            .log()
            .iter()
            .filter(|a| matches!(a, Access::Write(..)))
            .count();
        assert_eq!(writes_before, writes_after);
    }
}
