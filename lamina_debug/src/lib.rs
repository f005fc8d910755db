// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, `tracing` forwarding and redraw-region history for
//! lamina diagnostics.
//!
//! This crate provides [`TraceSink`](lamina_core::trace::TraceSink)
//! implementations for development:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output
//!   with wall-clock phase durations.
//! - [`log::LogSink`]: forwards every event to `tracing` as a structured
//!   event under the `lamina::trace` target.
//! - [`history::RedrawHistory`]: remembers recently repainted regions with a
//!   fading alpha, for hosts that overlay them on screen.
//!
//! [`Fanout`] feeds one tracer into several sinks.

use lamina_core::trace::{
    DamageEvent, DrawEvent, FrameSummary, InputEvent, PhaseBeginEvent, PhaseEndEvent, TraceSink,
};

pub mod history;
pub mod log;
pub mod pretty;

/// A [`TraceSink`] that forwards every event to each of its sinks in order.
#[derive(Default)]
pub struct Fanout<'a> {
    sinks: Vec<&'a mut dyn TraceSink>,
}

impl std::fmt::Debug for Fanout<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fanout")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl<'a> Fanout<'a> {
    /// Creates an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: &'a mut dyn TraceSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl TraceSink for Fanout<'_> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_phase_begin(e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_phase_end(e));
    }

    fn on_input(&mut self, e: &InputEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_input(e));
    }

    fn on_damage(&mut self, e: &DamageEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_damage(e));
    }

    fn on_draw(&mut self, e: &DrawEvent) {
        self.sinks.iter_mut().for_each(|s| s.on_draw(e));
    }

    fn on_frame_summary(&mut self, s: &FrameSummary) {
        self.sinks.iter_mut().for_each(|sink| sink.on_frame_summary(s));
    }
}
