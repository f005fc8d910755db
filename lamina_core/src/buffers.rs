// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offscreen buffers for group opacity.
//!
//! A node drawn with opacity below one paints its subtree into an offscreen
//! surface which is then composited once. Buffers are kept per node and reused
//! while they still cover the requested bounds. A buffer is released when:
//!
//! - its node is detached or reclaimed,
//! - it goes unused for `idle_frames` draws, or
//! - it stays more than four times larger than needed for `idle_frames`
//!   consecutive uses.

use std::collections::HashMap;

use kurbo::Rect;

use crate::node::NodeId;
use crate::surface::Surface;

/// Area ratio above which a reused buffer counts as oversized.
const OVERSIZE_FACTOR: f64 = 4.0;

#[derive(Debug)]
struct Entry<S> {
    surface: S,
    last_used: u64,
    oversized_uses: u32,
}

/// A buffer taken out of the pool for the duration of one draw.
#[derive(Debug)]
pub(crate) struct Lease<S> {
    pub(crate) surface: S,
    oversized_uses: u32,
}

/// Per-node offscreen surfaces.
#[derive(Debug)]
pub(crate) struct BufferPool<S> {
    entries: HashMap<NodeId, Entry<S>>,
    idle_frames: u32,
}

impl<S: Surface> BufferPool<S> {
    pub(crate) fn new(idle_frames: u32) -> Self {
        Self {
            entries: HashMap::new(),
            idle_frames,
        }
    }

    /// Takes the buffer for `node` out of the pool, allocating a new one from
    /// `screen` when there is none or it cannot cover `bounds`.
    pub(crate) fn checkout(&mut self, node: NodeId, screen: &mut S, bounds: Rect) -> Lease<S> {
        if let Some(entry) = self.entries.remove(&node) {
            if covers(entry.surface.bounds(), bounds) {
                let oversized_uses =
                    if area(entry.surface.bounds()) > OVERSIZE_FACTOR * area(bounds) {
                        entry.oversized_uses + 1
                    } else {
                        0
                    };
                if oversized_uses <= self.idle_frames {
                    return Lease {
                        surface: entry.surface,
                        oversized_uses,
                    };
                }
                tracing::debug!(?node, "shrinking oversized offscreen buffer");
            }
        }
        tracing::debug!(?node, ?bounds, "allocating offscreen buffer");
        Lease {
            surface: screen.allocate(bounds),
            oversized_uses: 0,
        }
    }

    /// Returns a buffer taken with [`checkout`](Self::checkout).
    pub(crate) fn checkin(&mut self, node: NodeId, lease: Lease<S>, draw_index: u64) {
        self.entries.insert(
            node,
            Entry {
                surface: lease.surface,
                last_used: draw_index,
                oversized_uses: lease.oversized_uses,
            },
        );
    }

    /// Drops the buffer of `node`, if any.
    pub(crate) fn release(&mut self, node: NodeId) {
        if self.entries.remove(&node).is_some() {
            tracing::trace!(?node, "released offscreen buffer");
        }
    }

    /// Drops buffers not used in the `idle_frames` draws before `draw_index`.
    pub(crate) fn collect_idle(&mut self, draw_index: u64) {
        let idle_frames = u64::from(self.idle_frames);
        self.entries
            .retain(|_, entry| draw_index.saturating_sub(entry.last_used) <= idle_frames);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

fn covers(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

fn area(rect: Rect) -> f64 {
    rect.width().max(0.0) * rect.height().max(0.0)
}
