// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Widget node data model.
//!
//! A *node* is one slot in the runtime's arena. Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is reclaimed, so a dangling handle panics instead of silently
//!   addressing whatever reused the slot.
//! - An owner: the node whose hook created it. Ownership outlives tree
//!   membership; a node that is not appended during a build pass is only
//!   *detached* and keeps its widget state, to be re-appended later.
//! - Topology, rebuilt on every build pass: a parent and an ordered child
//!   list. Later children paint over earlier siblings.
//! - Local properties written from hooks through a
//!   [`Context`](crate::Context): position, optional size override, hidden,
//!   disabled and opacity.
//! - Computed properties: the effective z (sum of z offsets from the root)
//!   and the previous-frame child snapshot used for damage tracking.
//!
//! Storage is struct-of-arrays with index-based handles.

mod id;
mod store;
mod traverse;

pub use id::NodeId;
pub(crate) use id::INVALID;
pub use store::NodeFlags;
pub(crate) use store::{FrameState, NodeStore};
pub use traverse::Children;
