// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage tracking for partial redraw.
//!
//! Damage is collected at the end of every successful update from three
//! sources, in this order:
//!
//! 1. **Structure.** Each in-tree node keeps a snapshot of its children from
//!    the previous frame: handle, bounds and effective z. If the current
//!    children differ in any way (count, order, identity, bounds or z), the
//!    node's visible bounds are damaged, along with the previous and current
//!    visible bounds of every child painting on a different layer than the
//!    node. The root, which has no parent, is compared against its own
//!    previous bounds. A viewport or scale change replaces this step with
//!    full damage.
//! 2. **Requests.** Nodes that asked for a redraw contribute their visible
//!    bounds, and so do their descendants whose effective z differs from
//!    their parent's.
//! 3. **Regions.** Explicit rectangles are added as given.
//!
//! Snapshots are refreshed between steps 1 and 2. Damage accumulates across
//! updates until a draw consumes it.

use core::mem;

use kurbo::Rect;

use crate::dirty;
use crate::node::{NodeId, NodeStore};
use crate::surface::Surface;

/// A region of the window that needs repainting.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DamageRegion {
    /// Nothing changed; the previous frame can be reused.
    #[default]
    None,
    /// The bounding box of everything that changed.
    Rect(Rect),
}

impl DamageRegion {
    /// Returns `true` if no region needs repainting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The damaged rectangle, if any.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        match self {
            Self::None => None,
            Self::Rect(rect) => Some(*rect),
        }
    }

    /// Grows the region to cover `rect`. Empty rectangles are ignored.
    pub fn add(&mut self, rect: Rect) {
        if is_empty_rect(rect) {
            return;
        }
        *self = match *self {
            Self::None => Self::Rect(rect),
            Self::Rect(current) => Self::Rect(current.union(rect)),
        };
    }

    /// Merges another damage region into this one.
    pub fn merge(&mut self, other: &Self) {
        if let Self::Rect(rect) = other {
            self.add(*rect);
        }
    }

    /// Resets to [`None`](Self::None).
    pub fn clear(&mut self) {
        *self = Self::None;
    }
}

/// Returns `true` for rectangles with no area, including NaN extents.
pub(crate) fn is_empty_rect(rect: Rect) -> bool {
    !(rect.width() > 0.0 && rect.height() > 0.0)
}

/// Why a rectangle was added to the damage region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageCause {
    /// The viewport size or scale changed.
    Viewport,
    /// A node's children changed since the previous frame.
    Structure,
    /// A node requested a redraw.
    Request,
    /// An explicit rectangle was requested.
    Region,
}

/// One rectangle contributed to the damage region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Contribution {
    pub(crate) cause: DamageCause,
    pub(crate) node: Option<NodeId>,
    pub(crate) rect: Rect,
}

/// A child as it was at the end of the previous update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SnapshotEntry {
    node: NodeId,
    bounds: Rect,
    visible: Rect,
    z: i32,
    /// The child painted on a different layer than its parent.
    offset_z: bool,
}

impl<S: Surface> NodeStore<S> {
    /// Collects this frame's damage contributions and refreshes snapshots.
    ///
    /// `full` substitutes the whole viewport for structural comparison.
    pub(crate) fn collect_damage(&mut self, full: bool, out: &mut Vec<Contribution>) {
        if full {
            let viewport = self.frame.viewport;
            out.push(Contribution {
                cause: DamageCause::Viewport,
                node: None,
                rect: Rect::from_origin_size((0.0, 0.0), viewport),
            });
        } else {
            self.collect_structural_damage(out);
        }
        self.reset_snapshots();
        self.collect_requested_damage(out);
    }

    fn collect_structural_damage(&mut self, out: &mut Vec<Contribution>) {
        let root_bounds = self.bounds_at(self.root);
        if root_bounds != self.root_bounds {
            // The root has no parent snapshot to catch this.
            let node = Some(self.id_of(self.root));
            for rect in [self.root_bounds, root_bounds] {
                out.push(Contribution {
                    cause: DamageCause::Structure,
                    node,
                    rect,
                });
            }
        }

        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            if !self.snapshot_matches(idx) {
                self.structural_damage(idx, out);
            }
            stack.extend(self.children[idx as usize].iter().rev().copied());
        }
    }

    fn snapshot_matches(&self, idx: u32) -> bool {
        let snapshot = &self.snapshot[idx as usize];
        let children = &self.children[idx as usize];
        snapshot.len() == children.len()
            && snapshot.iter().zip(children).all(|(entry, &c)| {
                entry.node == self.id_of(c)
                    && entry.z == self.effective_z[c as usize]
                    && entry.bounds == self.bounds_at(c)
            })
    }

    fn structural_damage(&mut self, idx: u32, out: &mut Vec<Contribution>) {
        let node = Some(self.id_of(idx));
        out.push(Contribution {
            cause: DamageCause::Structure,
            node,
            rect: self.visible_bounds_at(idx),
        });
        for k in 0..self.snapshot[idx as usize].len() {
            let entry = self.snapshot[idx as usize][k];
            if !entry.offset_z {
                continue;
            }
            out.push(Contribution {
                cause: DamageCause::Structure,
                node: Some(entry.node),
                rect: entry.visible,
            });
            // Wherever it is now, it has to be repainted there too.
            if self.is_alive(entry.node) {
                self.request_redraw_at(entry.node.idx);
            }
        }
        for &c in &self.children[idx as usize] {
            if self.differs_from_parent_z(c) {
                out.push(Contribution {
                    cause: DamageCause::Structure,
                    node: Some(self.id_of(c)),
                    rect: self.visible_bounds_at(c),
                });
            }
        }
    }

    /// Records every in-tree node's current children for the next comparison.
    fn reset_snapshots(&mut self) {
        self.root_bounds = self.bounds_at(self.root);
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let i = idx as usize;
            let mut snapshot = mem::take(&mut self.snapshot[i]);
            snapshot.clear();
            snapshot.extend(self.children[i].iter().map(|&c| SnapshotEntry {
                node: self.id_of(c),
                bounds: self.bounds_at(c),
                visible: self.visible_bounds_at(c),
                z: self.effective_z[c as usize],
                offset_z: self.effective_z[c as usize] != self.effective_z[i],
            }));
            self.snapshot[i] = snapshot;
            stack.extend(self.children[i].iter().copied());
        }
    }

    fn collect_requested_damage(&mut self, out: &mut Vec<Contribution>) {
        let marked: Vec<u32> = self
            .dirty
            .drain(dirty::REDRAW)
            .affected()
            .deterministic()
            .run()
            .collect();
        for idx in marked {
            let i = idx as usize;
            if i >= self.live.len() || !self.live[i] {
                continue;
            }
            let requested = mem::take(&mut self.redraw[i]);
            if !self.is_in_tree(idx) || !(requested || self.differs_from_parent_z(idx)) {
                continue;
            }
            out.push(Contribution {
                cause: DamageCause::Request,
                node: Some(self.id_of(idx)),
                rect: self.visible_bounds_at(idx),
            });
        }
        out.extend(self.redraw_rects.drain(..).map(|rect| Contribution {
            cause: DamageCause::Region,
            node: None,
            rect,
        }));
    }
}
