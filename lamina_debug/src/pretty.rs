// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Phase
//! durations are measured with [`Instant`] between the begin and end events.

use std::io::Write;
use std::time::Instant;

use lamina_core::trace::{
    DamageEvent, DrawEvent, FrameSummary, InputEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    phase_start: [Option<Instant>; 5],
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::with_writer(Box::new(std::io::stderr()))
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            phase_start: [None; 5],
        }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Build => "build",
        PhaseKind::Input => "input",
        PhaseKind::Update => "update",
        PhaseKind::Damage => "damage",
        PhaseKind::Draw => "draw",
    }
}

const fn phase_index(phase: PhaseKind) -> usize {
    match phase {
        PhaseKind::Build => 0,
        PhaseKind::Input => 1,
        PhaseKind::Update => 2,
        PhaseKind::Damage => 3,
        PhaseKind::Draw => 4,
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.phase_start[phase_index(e.phase)] = Some(Instant::now());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let Some(start) = self.phase_start[phase_index(e.phase)].take() else {
            return;
        };
        let _ = writeln!(
            self.writer,
            "[phase] frame={} {} {:.1}µs",
            e.frame_index,
            phase_name(e.phase),
            start.elapsed().as_secs_f64() * 1e6,
        );
    }

    fn on_input(&mut self, e: &InputEvent) {
        let verb = if e.aborted { "aborted" } else { "consumed" };
        let _ = writeln!(
            self.writer,
            "[input] frame={} {:?} {verb} by {:?}",
            e.frame_index, e.kind, e.node,
        );
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        let _ = writeln!(
            self.writer,
            "[damage] frame={} {:?} node={:?} rect=({}, {}, {}, {})",
            e.frame_index, e.cause, e.node, e.rect.x0, e.rect.y0, e.rect.x1, e.rect.y1,
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        let _ = writeln!(
            self.writer,
            "[draw] frame={} rect=({}, {}, {}, {}) buffers={}",
            e.frame_index, e.rect.x0, e.rect.y0, e.rect.x1, e.rect.y1, e.buffers,
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        let damage = match s.damage {
            Some(rect) => format!("({}, {}, {}, {})", rect.x0, rect.y0, rect.x1, rect.y1),
            None => "none".to_owned(),
        };
        let _ = writeln!(
            self.writer,
            "[summary] frame={} nodes={} layers={} damage={damage} cursor={:?}",
            s.frame_index, s.node_count, s.layer_count, s.cursor,
        );
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use lamina_core::DamageCause;

    use super::*;

    #[test]
    fn pretty_print_summary() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_frame_summary(&FrameSummary {
            frame_index: 1,
            node_count: 3,
            layer_count: 1,
            damage: None,
            pointing: None,
            button: None,
            cursor: None,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("[summary]"), "got: {output}");
        assert!(output.contains("frame=1"), "got: {output}");
        assert!(output.contains("damage=none"), "got: {output}");
    }

    #[test]
    fn phase_end_without_begin_is_silent() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 1,
            phase: PhaseKind::Draw,
        });
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 2,
            phase: PhaseKind::Build,
        });
        sink.on_phase_end(&PhaseEndEvent {
            frame_index: 2,
            phase: PhaseKind::Build,
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert_eq!(output.lines().count(), 1, "got: {output}");
        assert!(output.starts_with("[phase] frame=2 build"), "got: {output}");
    }

    #[test]
    fn pretty_print_damage() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_damage(&DamageEvent {
            frame_index: 4,
            cause: DamageCause::Region,
            node: None,
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
        });
        let output = String::from_utf8(sink.into_writer()).unwrap();
        assert!(output.contains("Region"), "got: {output}");
        assert!(output.contains("(1, 2, 3, 4)"), "got: {output}");
    }
}
