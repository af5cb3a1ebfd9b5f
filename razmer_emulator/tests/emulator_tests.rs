//! End-to-end emulator tests on a simulated clock.
//!
//! The fast clock counts microseconds, the slow clock is a millisecond view
//! of the same counter, so one `advance` moves both.

use proptest::prelude::*;
use razmer_common::config::ConfigLoader;
use razmer_common::emulator::EmulatorConfig;
use razmer_common::format::Layout;
use razmer_common::link::LineAssembler;
use razmer_common::timer::ManualClock;
use razmer_emulator::buffer::SignalBuffer;
use razmer_emulator::lines::{BLines, OutputLines};
use razmer_emulator::mode::ModeState;
use razmer_emulator::scan::STROBES_PER_CYCLE;
use razmer_emulator::{EmulatorCore, SimulatedLines};
use std::fs;
use tempfile::TempDir;

/// Keeps every digit and pattern.
#[derive(Debug, Default)]
struct Probe {
    digits: Vec<(u8, bool)>,
    columns: Vec<BLines>,
}

impl OutputLines for Probe {
    fn set_columns(&mut self, lines: BLines) {
        self.columns.push(lines);
    }

    fn write_digit(&mut self, sign: u8, error: bool) {
        self.digits.push((sign, error));
    }
}

fn core_with<L: OutputLines>(
    config: EmulatorConfig,
    lines: L,
) -> (EmulatorCore<ManualClock, ManualClock, L>, ManualClock) {
    let micros = ManualClock::new(0);
    let core = EmulatorCore::new(config, micros.clone(), micros.divided(1000), lines, 11).unwrap();
    (core, micros)
}

#[test]
fn readout_matches_buffer_each_cycle() {
    let (mut core, micros) = core_with(EmulatorConfig::default(), Probe::default());
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);

    for cycle in 0..20 {
        let before = core.buffer().clone();
        let digits_before = core.lines().digits.len();
        let mut ready = 0;
        for _ in 0..STROBES_PER_CYCLE {
            micros.advance(500);
            if core.poll(&mut sink) {
                ready += 1;
            }
        }
        assert_eq!(ready, 1, "cycle {cycle}");

        // Mutations land after the last digit of a cycle, so each readout
        // shows one consistent buffer.
        let readout = &core.lines().digits[digits_before..];
        assert_eq!(readout.len(), 28);
        let expected: Vec<_> = (0..28)
            .map(|i| (before.item_sign(i), before.item_error(i)))
            .collect();
        assert_eq!(readout, expected.as_slice());
    }
}

#[test]
fn column_patterns_per_cycle() {
    let (mut core, micros) = core_with(EmulatorConfig::default(), Probe::default());
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);
    for _ in 0..STROBES_PER_CYCLE {
        micros.advance(500);
        core.poll(&mut sink);
    }

    let columns = &core.lines().columns;
    assert_eq!(columns.len(), 40);
    let overflow: Vec<u8> = columns[34..].iter().map(|c| c.bits()).collect();
    assert_eq!(overflow, vec![0x21, 0x22, 0x24, 0x28, 0x30, 0x01]);
    assert!(columns[..34].iter().all(|c| !c.contains(BLines::A7)));
}

#[test]
fn mode_phase_boundaries() {
    let (mut core, micros) = core_with(EmulatorConfig::default(), SimulatedLines::new(true));
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);

    let mut entered = Vec::new();
    let mut state = core.mode().state();
    let mut t_us: u64 = 0;
    while t_us < 24_000_000 {
        micros.advance(500);
        t_us += 500;
        core.poll(&mut sink);
        if core.mode().state() != state {
            state = core.mode().state();
            entered.push((t_us, state));
        }
    }

    // The first readout (17.5 ms) arms the timers, later steps only happen
    // on readouts (every 20 ms).
    let states: Vec<_> = entered.iter().map(|&(_, s)| s).collect();
    assert_eq!(
        states,
        vec![ModeState::Step1, ModeState::Step2, ModeState::Step3, ModeState::Step1]
    );
    for (&(t, _), boundary) in entered[1..].iter().zip([10_000_000u64, 20_000_000, 23_000_000]) {
        assert!(
            t >= boundary && t < boundary + 40_000,
            "entered at {t} us, expected just after {boundary} us"
        );
    }
    assert!(core.buffer().codes().iter().all(|c| !c.error()));
}

#[test]
fn frames_are_well_formed_and_count_after_switch() {
    let (mut core, micros) = core_with(EmulatorConfig::default(), SimulatedLines::new(false));
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);

    // Six seconds: five of random frames, one incrementing.
    for _ in 0..12_000 {
        micros.advance(500);
        core.poll(&mut sink);
    }
    assert_eq!(sink.len(), 299);

    let layout = Layout::DEFAULT;
    let frames: Vec<_> = sink.iter().map(|l| layout.parse(l).unwrap()).collect();
    for values in &frames {
        assert!(values.iter().all(|v| (layout.min_axis()..=layout.max_axis()).contains(v)));
    }

    // Once incrementing, every sent frame is one above the previous one.
    let tail = &frames[frames.len() - 20..];
    for pair in tail.windows(2) {
        for (a, b) in pair[0].iter().zip(pair[1].iter()) {
            assert_eq!(*b, (*a + 1).min(layout.max_axis()));
        }
    }
}

#[test]
fn receiver_reassembles_byte_stream() {
    let (mut core, micros) = core_with(EmulatorConfig::default(), SimulatedLines::new(true));
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);
    for _ in 0..1_000 {
        micros.advance(500);
        core.poll(&mut sink);
    }
    assert_eq!(sink.len(), 24);

    let stream: Vec<u8> = sink.concat().into_bytes();
    let mut receiver = LineAssembler::new();
    let mut received = Vec::new();
    // Arbitrary chunking, as a UART would deliver it.
    for chunk in stream.chunks(7) {
        for &byte in chunk {
            if receiver.push_byte(byte) {
                let line = receiver.take_message().unwrap();
                received.push(Layout::DEFAULT.parse(line).unwrap());
            }
        }
    }

    assert_eq!(received.len(), sink.len());
    assert_eq!(receiver.dropped(), 0);
    for (line, values) in sink.iter().zip(&received) {
        assert_eq!(Layout::DEFAULT.format(values).as_str(), line);
    }
}

#[test]
fn config_file_drives_core() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("emulator.toml");
    fs::write(
        &path,
        r#"
[scan]
strobe_interval_us = 100
invert_b_signals = false

[buffer]
sign_slots = 0

[axes]
count = 2
digits = 3
dot_position = 3
frame_rate_hz = 100
"#,
    )
    .unwrap();

    let config = EmulatorConfig::load_validated(&path).unwrap();
    let (mut core, micros) = core_with(config, SimulatedLines::new(false));
    let mut sink: Vec<String> = Vec::new();
    core.poll(&mut sink);
    for _ in 0..2_000 {
        micros.advance(100);
        core.poll(&mut sink);
    }

    // 0.2 s at 100 Hz, first tick has nothing to send.
    assert_eq!(sink.len(), 19);
    assert!(sink.iter().all(|l| l.len() == 18));
    assert_eq!(core.stats().scan_cycles, 50);
    assert_eq!(core.buffer().item_sign(27), 7);
    assert_eq!(core.lines().column_port(), core.lines().columns().bits());
}

proptest! {
    /// Digit entries count modulo 10 and keep their error flag.
    #[test]
    fn change_data_counts_mod_ten(k in 0usize..40, flagged in 0usize..24) {
        let mut buffer = SignalBuffer::default();
        for _ in 0..flagged {
            buffer.change_error();
        }
        let start: Vec<u8> = (0..24).map(|i| buffer.item_sign(i)).collect();
        for _ in 0..k {
            buffer.change_data();
        }
        for (i, &s) in start.iter().enumerate() {
            prop_assert_eq!(buffer.item_sign(i), ((s as usize + k) % 10) as u8);
        }
        prop_assert_eq!(buffer.item_error(flagged), flagged > 0);
    }

    /// A full lap of the error cursor returns to the start with at most
    /// one flag set along the way.
    #[test]
    fn change_error_lap(start in 0usize..28) {
        let mut buffer = SignalBuffer::default();
        for _ in 0..start {
            buffer.change_error();
        }
        let origin = buffer.error_index();
        for _ in 0..buffer.len() {
            buffer.change_error();
            prop_assert!(buffer.codes().iter().filter(|c| c.error()).count() <= 1);
        }
        prop_assert_eq!(buffer.error_index(), origin);
    }
}
