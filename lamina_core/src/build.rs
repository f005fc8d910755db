// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree build passes.
//!
//! A build pass walks the tree top-down from the root. Each visited node
//! forgets its previous children, runs its widget's
//! [`build`](crate::Widget::build) hook, and the nodes appended there become
//! its new children, which are visited next in order.
//!
//! After the walk, the sweep:
//!
//! 1. Detaches every node that was attached before the pass but was not
//!    appended during it. Detached nodes keep their widget and ownership but
//!    lose their parent, children and damage snapshot.
//! 2. Reclaims nodes queued by [`Context::remove`](crate::Context::remove),
//!    together with everything they own, unless they were appended again.

use kurbo::{Point, Size};

use crate::dirty;
use crate::error::FrameError;
use crate::node::{INVALID, NodeId, NodeStore};
use crate::surface::Surface;

/// Collects the children a [`build`](crate::Widget::build) hook declares.
#[derive(Debug, Default)]
pub struct ChildAppender {
    children: Vec<AppendedChild>,
}

#[derive(Clone, Copy, Debug)]
struct AppendedChild {
    node: NodeId,
    position: Point,
    size: Option<Size>,
}

impl ChildAppender {
    /// Appends `node` at `position`, keeping its current size.
    ///
    /// Later children paint over earlier ones.
    pub fn append(&mut self, node: NodeId, position: Point) {
        self.children.push(AppendedChild {
            node,
            position,
            size: None,
        });
    }

    /// Appends `node` at `position` and overrides its size.
    pub fn append_sized(&mut self, node: NodeId, position: Point, size: Size) {
        self.children.push(AppendedChild {
            node,
            position,
            size: Some(size),
        });
    }

    /// Number of children appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<S: Surface> NodeStore<S> {
    /// Runs one full build pass followed by the sweep.
    ///
    /// # Panics
    ///
    /// Panics if a node is appended twice in the pass, or if an appended
    /// handle is stale.
    pub(crate) fn build(&mut self) -> Result<(), FrameError> {
        self.build_epoch += 1;
        let root = self.root;
        self.epoch[root as usize] = self.build_epoch;
        self.position[root as usize] = Point::ZERO;
        self.build_node(root)?;
        self.sweep();
        Ok(())
    }

    fn build_node(&mut self, idx: u32) -> Result<(), FrameError> {
        self.clear_children(idx);

        let mut appender = ChildAppender::default();
        self.with_widget(idx, |widget, cx| widget.build(cx, &mut appender))
            .map_err(|source| FrameError::Build {
                node: self.id_of(idx),
                source,
            })?;

        for child in appender.children {
            self.attach(idx, child);
        }
        for i in 0..self.children[idx as usize].len() {
            let child = self.children[idx as usize][i];
            self.build_node(child)?;
        }
        Ok(())
    }

    /// Empties the child list of `idx` and drops the matching dependency edges.
    ///
    /// The former children keep their parent link until they are appended
    /// elsewhere or swept, so they stay hit-testable for the rest of the pass.
    fn clear_children(&mut self, idx: u32) {
        let children = core::mem::take(&mut self.children[idx as usize]);
        for &c in &children {
            self.dirty.remove_dependency(c, idx, dirty::REDRAW);
        }
        // Keep the allocation.
        let mut children = children;
        children.clear();
        self.children[idx as usize] = children;
    }

    fn attach(&mut self, parent: u32, child: AppendedChild) {
        self.validate(child.node);
        let c = child.node.idx;
        assert!(
            self.epoch[c as usize] != self.build_epoch,
            "node {:?} appended twice in one build pass",
            child.node
        );
        self.epoch[c as usize] = self.build_epoch;
        self.parent[c as usize] = parent;
        self.position[c as usize] = child.position;
        if let Some(size) = child.size {
            self.width[c as usize] = Some(size.width);
            self.height[c as usize] = Some(size.height);
        }
        self.children[parent as usize].push(c);
        let _ = self.dirty.add_dependency(c, parent, dirty::REDRAW);
    }

    /// Detaches unreached nodes and reclaims removed ones.
    fn sweep(&mut self) {
        for idx in 0..self.len {
            let i = idx as usize;
            if !self.live[i] || self.epoch[i] == self.build_epoch {
                continue;
            }
            if self.parent[i] == INVALID && self.children[i].is_empty() {
                continue;
            }
            tracing::trace!(node = ?self.id_of(idx), "detaching node");
            self.parent[i] = INVALID;
            self.clear_children(idx);
            self.snapshot[i].clear();
            self.redraw[i] = false;
            if self.focus == idx {
                self.focus = INVALID;
            }
            let id = self.id_of(idx);
            self.detached.push(id);
        }

        if self.pending_removal.is_empty() {
            return;
        }

        let mut owned: Vec<Vec<u32>> = vec![Vec::new(); self.len as usize];
        for j in 0..self.len {
            let owner = self.owner[j as usize];
            if self.live[j as usize] && owner != INVALID {
                owned[owner as usize].push(j);
            }
        }

        let mut queue = core::mem::take(&mut self.pending_removal);
        while let Some(idx) = queue.pop() {
            if !self.live[idx as usize] {
                continue;
            }
            if self.epoch[idx as usize] == self.build_epoch {
                // Still appended somewhere; retry on a later pass.
                if !self.pending_removal.contains(&idx) {
                    self.pending_removal.push(idx);
                }
                continue;
            }
            queue.extend(core::mem::take(&mut owned[idx as usize]));
            tracing::debug!(node = ?self.id_of(idx), "reclaiming node");
            self.reclaim(idx);
        }
    }
}
