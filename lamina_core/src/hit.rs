// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Topmost-wins hit testing.
//!
//! A target is hit at a point when, walking the same layer and child order
//! input dispatch uses, the first visible, enabled node whose visible bounds
//! contain the point is the target itself. Every layer at or above the
//! target's effective z is considered, highest first, so a popup covering the
//! target shadows it.

use kurbo::Point;

use crate::node::NodeStore;
use crate::surface::Surface;

/// Result of walking one layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HitTest {
    /// Nothing in this layer contains the point.
    Miss,
    /// Some other node is the topmost at the point.
    Other,
    /// The target is the topmost at the point.
    Target,
}

impl<S: Surface> NodeStore<S> {
    /// Returns whether `target` is the topmost node at `point`.
    ///
    /// Detached nodes are never hit.
    pub(crate) fn is_hit_at(&self, target: u32, point: Point) -> bool {
        if !self.is_in_tree(target) {
            return false;
        }
        let z = self.effective_z[target as usize];
        for layer in self.layers.descending().take_while(|&layer| layer >= z) {
            match self.hit_test(self.root, target, point, layer) {
                HitTest::Miss => {}
                HitTest::Other => return false,
                HitTest::Target => return true,
            }
        }
        false
    }

    fn hit_test(&self, idx: u32, target: u32, point: Point, z: i32) -> HitTest {
        let flags = self.flags[idx as usize];
        if flags.hidden || flags.disabled {
            return HitTest::Miss;
        }
        for &child in self.children[idx as usize].iter().rev() {
            match self.hit_test(child, target, point, z) {
                HitTest::Miss => {}
                hit => return hit,
            }
        }
        if self.effective_z[idx as usize] != z || !self.visible_bounds_at(idx).contains(point) {
            return HitTest::Miss;
        }
        if idx == target {
            HitTest::Target
        } else {
            HitTest::Other
        }
    }
}
