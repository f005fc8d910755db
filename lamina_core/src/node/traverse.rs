// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::slice;

use super::id::NodeId;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`Context::children`](crate::Context::children).
#[derive(Clone, Debug)]
pub struct Children<'a> {
    generation: &'a [u32],
    slots: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(generation: &'a [u32], slots: &'a [u32]) -> Self {
        Self {
            generation,
            slots: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let &idx = self.slots.next()?;
        Some(NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        let &idx = self.slots.next_back()?;
        Some(NodeId {
            idx,
            generation: self.generation[idx as usize],
        })
    }
}

impl ExactSizeIterator for Children<'_> {}
