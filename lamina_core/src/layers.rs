// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effective z resolution.
//!
//! Every node's effective z is the sum of the z offsets reported by its
//! widget and all of its ancestors' widgets. Input, cursor and hit testing
//! visit the distinct values from highest to lowest; compositing visits them
//! from lowest to highest.

use crate::node::{INVALID, NodeStore};
use crate::surface::Surface;

/// The sorted, duplicate-free set of effective z values present in the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerSet {
    values: Vec<i32>,
}

impl LayerSet {
    /// Rebuilds the set from arbitrary values.
    pub(crate) fn rebuild(&mut self, values: impl IntoIterator<Item = i32>) {
        self.values.clear();
        self.values.extend(values);
        self.values.sort_unstable();
        self.values.dedup();
    }

    /// Iterates from the lowest layer to the highest (paint order).
    pub fn ascending(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.values.iter().copied()
    }

    /// Iterates from the highest layer to the lowest (input order).
    pub fn descending(&self) -> impl DoubleEndedIterator<Item = i32> + '_ {
        self.values.iter().rev().copied()
    }

    /// Returns whether `z` is present.
    #[must_use]
    pub fn contains(&self, z: i32) -> bool {
        self.values.binary_search(&z).is_ok()
    }

    /// Number of distinct layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` before the first resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies the values out; used where the store is mutated while iterating.
    pub(crate) fn to_vec(&self) -> Vec<i32> {
        self.values.clone()
    }
}

impl<S: Surface> NodeStore<S> {
    /// Recomputes `effective_z` for every node reachable from the root and
    /// rebuilds the layer set.
    ///
    /// Z offsets are re-read from the widgets, so a widget may change its
    /// offset between frames.
    pub(crate) fn resolve_layers(&mut self) {
        let mut values = Vec::new();
        let mut stack = vec![(self.root, 0_i32)];
        while let Some((idx, parent_z)) = stack.pop() {
            let i = idx as usize;
            if let Some(widget) = self.widgets[i].as_deref() {
                self.z_offset[i] = widget.z_offset();
            }
            let z = parent_z.saturating_add(self.z_offset[i]);
            self.effective_z[i] = z;
            values.push(z);
            stack.extend(self.children[i].iter().rev().map(|&c| (c, z)));
        }
        debug_assert!(self.parent[self.root as usize] == INVALID);
        self.layers.rebuild(values);
    }
}
