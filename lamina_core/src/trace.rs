// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing hooks for the frame pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! [`Runtime::update_traced`](crate::Runtime::update_traced) and
//! [`Runtime::draw_traced`](crate::Runtime::draw_traced) call at each stage.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Independently of this module, the runtime always emits `tracing` events;
//! a sink is for tools that want structured per-frame data.

use kurbo::Rect;

use crate::damage::DamageCause;
use crate::input::InputKind;
use crate::node::NodeId;
use crate::widget::CursorShape;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which stage of the frame pipeline is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// A build pass (runs twice per update).
    Build,
    /// Pointing and button dispatch.
    Input,
    /// Update hooks and z resolution.
    Update,
    /// Damage collection.
    Damage,
    /// Drawing the damaged region.
    Draw,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pipeline stage.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which stage is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pipeline stage.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which stage is ending.
    pub phase: PhaseKind,
}

/// Emitted when an input hook stops dispatch.
#[derive(Clone, Copy, Debug)]
pub struct InputEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Which input phase.
    pub kind: InputKind,
    /// The handling node.
    pub node: NodeId,
    /// Whether the handler aborted.
    pub aborted: bool,
}

/// Emitted for every rectangle added to the damage region.
#[derive(Clone, Copy, Debug)]
pub struct DamageEvent {
    /// Frame counter.
    pub frame_index: u64,
    /// Why the rectangle was added.
    pub cause: DamageCause,
    /// The node responsible, if any.
    pub node: Option<NodeId>,
    /// The rectangle as requested, before empty rectangles are dropped.
    pub rect: Rect,
}

/// Emitted after a draw that painted something.
#[derive(Clone, Copy, Debug)]
pub struct DrawEvent {
    /// Frame counter of the update this draw followed.
    pub frame_index: u64,
    /// The repainted region.
    pub rect: Rect,
    /// Offscreen buffers alive after the draw.
    pub buffers: usize,
}

/// Per-update summary.
#[derive(Clone, Copy, Debug)]
pub struct FrameSummary {
    /// Frame counter.
    pub frame_index: u64,
    /// Live nodes, attached or not.
    pub node_count: usize,
    /// Distinct effective z values.
    pub layer_count: usize,
    /// Accumulated damage after this update.
    pub damage: Option<Rect>,
    /// Node that handled pointing input.
    pub pointing: Option<NodeId>,
    /// Node that handled button input.
    pub button: Option<NodeId>,
    /// Resolved cursor shape.
    pub cursor: Option<CursorShape>,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pipeline stage.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pipeline stage.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called when an input hook stops dispatch.
    fn on_input(&mut self, e: &InputEvent) {
        _ = e;
    }

    /// Called for every damage contribution.
    fn on_damage(&mut self, e: &DamageEvent) {
        _ = e;
    }

    /// Called after a draw.
    fn on_draw(&mut self, e: &DrawEvent) {
        _ = e;
    }

    /// Called at the end of a successful update.
    fn on_frame_summary(&mut self, s: &FrameSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InputEvent`].
    #[inline]
    pub fn input(&mut self, e: &InputEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_input(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DamageEvent`].
    #[inline]
    pub fn damage(&mut self, e: &DamageEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_damage(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`DrawEvent`].
    #[inline]
    pub fn draw(&mut self, e: &DrawEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_draw(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FrameSummary`].
    #[inline]
    pub fn frame_summary(&mut self, s: &FrameSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_frame_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> FrameSummary {
        FrameSummary {
            frame_index: 3,
            node_count: 4,
            layer_count: 2,
            damage: Some(Rect::new(0.0, 0.0, 10.0, 10.0)),
            pointing: None,
            button: None,
            cursor: None,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_phase_begin(&PhaseBeginEvent {
            frame_index: 0,
            phase: PhaseKind::Build,
        });
        sink.on_frame_summary(&sample_summary());
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.phase_end(&PhaseEndEvent {
            frame_index: 0,
            phase: PhaseKind::Draw,
        });
        tracer.frame_summary(&sample_summary());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        struct RecordingSink {
            frames: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_frame_summary(&mut self, s: &FrameSummary) {
                self.frames.push(s.frame_index);
            }
        }

        let mut sink = RecordingSink { frames: Vec::new() };
        let mut tracer = Tracer::new(&mut sink);
        tracer.frame_summary(&sample_summary());
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.frames, &[3]);
    }
}
