// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode widget tree runtime.
//!
//! `lamina_core` owns a tree of stateful widget nodes, rebuilds it every
//! frame from the widgets' own declarations, routes pointer and button input
//! to the topmost interested node, tracks which parts of the window changed,
//! and repaints only those, compositing translucent subtrees as a group.
//!
//! # Architecture
//!
//! One host tick drives the pipeline:
//!
//! ```text
//!   FrameInput ──► build ──► input (pointing, button) ──► build
//!                                                           │
//!                 ┌─────────────────────────────────────────┘
//!                 ▼
//!   cursor ──► update hooks ──► z resolve ──► damage ──► FrameOutcome
//!
//!   Runtime::draw(screen) ──► layered, damage-clipped paint
//! ```
//!
//! **Nodes** live in a struct-of-arrays arena addressed by generational
//! [`NodeId`] handles. A node's lifetime follows its owner, not tree
//! membership: a node left out of a build pass is detached, keeps its widget
//! state, and can be appended again later. [`Context::remove`] reclaims it.
//!
//! **[`Widget`]** is the only extension point. Its hooks receive a
//! [`Context`] for reading and mutating the tree; `build` also gets a
//! [`ChildAppender`].
//!
//! **Z order.** Each widget reports a z offset; a node's effective z is the
//! sum along its ancestry. Input, cursor and hit testing visit layers from
//! the top, painting from the bottom. Within a layer, later siblings are
//! above earlier ones and children above their parent.
//!
//! **Damage.** Structural changes are found by comparing each node's children
//! with the previous frame; explicit requests go through
//! `understory_dirty` so that descendants painting on other layers follow
//! their ancestor. See [`DamageRegion`].
//!
//! **[`Surface`]** is the backend seam: allocate, clear, composite.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pipeline instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Logging
//!
//! The runtime emits `tracing` events at `trace` and `debug` level. Setting
//! [`DebugOptions::log_input`] or [`DebugOptions::log_redraw_regions`] (or the
//! `LAMINA_DEBUG` environment variable, see [`DebugOptions::from_env`])
//! raises input and redraw events to `info`.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `serde` (disabled by default): `Serialize`/`Deserialize` for
//!   [`RuntimeOptions`] and the plain enums.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod buffers;
mod build;
mod compose;
mod context;
mod damage;
mod dirty;
mod error;
mod hit;
mod input;
mod layers;
mod node;
mod options;
mod runtime;
mod surface;
mod widget;

pub mod trace;

#[cfg(test)]
mod testing;

pub use build::ChildAppender;
pub use context::Context;
pub use damage::{DamageCause, DamageRegion};
pub use error::{FrameError, WidgetError};
pub use input::{Dispatch, InputKind};
pub use layers::LayerSet;
pub use node::{Children, NodeFlags, NodeId};
pub use options::{DebugOptions, RuntimeOptions};
pub use runtime::{FrameInput, FrameOutcome, Runtime};
pub use surface::{Canvas, Surface};
pub use widget::{CursorShape, HandleInputResult, SizeContext, Widget};
