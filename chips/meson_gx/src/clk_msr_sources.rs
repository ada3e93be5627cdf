// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock sources wired to the measurement block.
//!
//! Source-select slots that are not listed here are not connected to a clock
//! on this family and must not be measured.

use kernel::hil::clock_measure::ClockSource;

/// Meson GX (GXBB/GXL/GXM) source table, in ascending id order.
pub const GX_CLK_MSR_SOURCES: &[ClockSource] = &[
    ClockSource::new(0, "ring_osc_out_ee_0"),
    ClockSource::new(1, "ring_osc_out_ee_1"),
    ClockSource::new(2, "ring_osc_out_ee_2"),
    ClockSource::new(3, "a53_ring_osc"),
    ClockSource::new(4, "gp0_pll"),
    ClockSource::new(6, "enci"),
    ClockSource::new(7, "clk81"),
    ClockSource::new(8, "encp"),
    ClockSource::new(9, "encl"),
    ClockSource::new(10, "vdac"),
    ClockSource::new(11, "rgmii_tx"),
    ClockSource::new(12, "pdm"),
    ClockSource::new(13, "amclk"),
    ClockSource::new(14, "fec_0"),
    ClockSource::new(15, "fec_1"),
    ClockSource::new(16, "fec_2"),
    ClockSource::new(17, "sys_pll_div16"),
    ClockSource::new(18, "sys_cpu_div16"),
    ClockSource::new(19, "hdmitx_sys"),
    ClockSource::new(20, "rtc_osc_out"),
    ClockSource::new(21, "i2s_in_src0"),
    ClockSource::new(22, "eth_phy_ref"),
    ClockSource::new(23, "hdmi_todig"),
    ClockSource::new(26, "sc_int"),
    ClockSource::new(28, "sar_adc"),
    ClockSource::new(31, "mpll_test_out"),
    ClockSource::new(32, "vdec"),
    ClockSource::new(35, "mali"),
    ClockSource::new(36, "hdmi_tx_pixel"),
    ClockSource::new(37, "i958"),
    ClockSource::new(38, "vdin_meas"),
    ClockSource::new(39, "pcm_sclk"),
    ClockSource::new(40, "pcm_mclk"),
    ClockSource::new(41, "eth_rx_or_rmii"),
    ClockSource::new(42, "mp0_out"),
    ClockSource::new(43, "fclk_div5"),
    ClockSource::new(44, "pwm_b"),
    ClockSource::new(45, "pwm_a"),
    ClockSource::new(46, "vpu"),
    ClockSource::new(47, "ddr_dpll_pt"),
    ClockSource::new(48, "mp1_out"),
    ClockSource::new(49, "mp2_out"),
    ClockSource::new(50, "mp3_out"),
    ClockSource::new(51, "nand_core"),
    ClockSource::new(52, "sd_emmc_b"),
    ClockSource::new(53, "sd_emmc_a"),
    ClockSource::new(55, "vid_pll_div_out"),
    ClockSource::new(56, "cci"),
    ClockSource::new(57, "wave420l_c"),
    ClockSource::new(58, "wave420l_b"),
    ClockSource::new(59, "hcodec"),
    ClockSource::new(60, "alt_32k"),
    ClockSource::new(61, "gpio_msr"),
    ClockSource::new(62, "hevc"),
    ClockSource::new(66, "vid_lock"),
    ClockSource::new(70, "pwm_f"),
    ClockSource::new(71, "pwm_e"),
    ClockSource::new(72, "pwm_d"),
    ClockSource::new(73, "pwm_C"),
    ClockSource::new(75, "aoclkx2_int"),
    ClockSource::new(76, "aoclk_int"),
    ClockSource::new(77, "rng_ring_osc_0"),
    ClockSource::new(78, "rng_ring_osc_1"),
    ClockSource::new(79, "rng_ring_osc_2"),
    ClockSource::new(80, "rng_ring_osc_3"),
    ClockSource::new(81, "vapb"),
    ClockSource::new(82, "ge2d"),
];
