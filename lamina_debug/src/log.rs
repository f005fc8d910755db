// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding trace events to `tracing`.
//!
//! [`LogSink`] turns each pipeline event into a structured `tracing` event
//! under the `lamina::trace` target, so a host that already installs a
//! subscriber gets per-frame data without a second output channel. Phase
//! boundaries and damage contributions are `trace` level; input handling,
//! draws and frame summaries are `debug`.

use lamina_core::trace::{
    DamageEvent, DrawEvent, FrameSummary, InputEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

/// A [`TraceSink`] that emits `tracing` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        tracing::trace!(
            target: "lamina::trace",
            frame = e.frame_index,
            phase = ?e.phase,
            "phase begin"
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        tracing::trace!(
            target: "lamina::trace",
            frame = e.frame_index,
            phase = ?e.phase,
            "phase end"
        );
    }

    fn on_input(&mut self, e: &InputEvent) {
        tracing::debug!(
            target: "lamina::trace",
            frame = e.frame_index,
            kind = ?e.kind,
            node = ?e.node,
            aborted = e.aborted,
            "input handled"
        );
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        tracing::trace!(
            target: "lamina::trace",
            frame = e.frame_index,
            cause = ?e.cause,
            node = ?e.node,
            rect = ?e.rect,
            "damage"
        );
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        tracing::debug!(
            target: "lamina::trace",
            frame = e.frame_index,
            rect = ?e.rect,
            buffers = e.buffers,
            "draw"
        );
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        tracing::debug!(
            target: "lamina::trace",
            frame = s.frame_index,
            nodes = s.node_count,
            layers = s.layer_count,
            damage = ?s.damage,
            pointing = ?s.pointing,
            button = ?s.button,
            cursor = ?s.cursor,
            "frame"
        );
    }
}
