// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, widget lending and property management.

use core::any::Any;
use core::fmt;

use kurbo::{Point, Rect, Size};
use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::id::{INVALID, NodeId};
use crate::context::Context;
use crate::damage::SnapshotEntry;
use crate::dirty;
use crate::layers::LayerSet;
use crate::surface::Surface;
use crate::widget::{SizeContext, Widget};

/// Per-node boolean flags.
///
/// Both flags are inherited: a hidden ancestor hides the whole subtree and a
/// disabled ancestor disables it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the node (and its subtree) is hidden.
    pub hidden: bool,
    /// Whether the node (and its subtree) ignores input.
    pub disabled: bool,
}

/// Values fixed for the duration of one `update`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FrameState {
    pub(crate) index: u64,
    pub(crate) viewport: Size,
    /// Device scale times application scale.
    pub(crate) scale: f64,
    pub(crate) cursor: Point,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            index: 0,
            viewport: Size::ZERO,
            scale: 1.0,
            cursor: Point::ZERO,
        }
    }
}

/// Struct-of-arrays storage for all nodes.
///
/// A node's widget is moved out of its slot while one of its hooks runs (see
/// [`with_widget`](Self::with_widget)); during that window the slot is empty
/// and the node's natural size is served from the cache.
pub(crate) struct NodeStore<S: Surface> {
    // -- Topology (rebuilt every build pass) --
    pub(crate) parent: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,
    pub(crate) owner: Vec<u32>,

    // -- Local properties (set from hooks) --
    pub(crate) position: Vec<Point>,
    pub(crate) width: Vec<Option<f64>>,
    pub(crate) height: Vec<Option<f64>>,
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) opacity: Vec<f32>,

    // -- Computed properties --
    pub(crate) z_offset: Vec<i32>,
    pub(crate) effective_z: Vec<i32>,
    pub(crate) natural_size: Vec<Size>,

    // -- Frame bookkeeping --
    pub(crate) snapshot: Vec<Vec<SnapshotEntry>>,
    pub(crate) redraw: Vec<bool>,
    /// Root bounds at the end of the previous update.
    pub(crate) root_bounds: Rect,
    pub(crate) epoch: Vec<u64>,
    pub(crate) build_epoch: u64,

    // -- Widgets --
    pub(crate) widgets: Vec<Option<Box<dyn Widget<S>>>>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) live: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) pending_removal: Vec<u32>,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
    pub(crate) redraw_rects: Vec<Rect>,

    // -- Shared state --
    pub(crate) root: u32,
    pub(crate) frame: FrameState,
    pub(crate) layers: LayerSet,
    pub(crate) focus: u32,
    /// Nodes detached or reclaimed since the runtime last released their buffers.
    pub(crate) detached: Vec<NodeId>,
}

impl<S: Surface> fmt::Debug for NodeStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.len)
            .field("root", &self.root)
            .field("free", &self.free_list.len())
            .field("layers", &self.layers)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> NodeStore<S> {
    /// Creates a store holding only the root node.
    pub(crate) fn new(root: Box<dyn Widget<S>>) -> Self {
        let mut store = Self {
            parent: Vec::new(),
            children: Vec::new(),
            owner: Vec::new(),
            position: Vec::new(),
            width: Vec::new(),
            height: Vec::new(),
            flags: Vec::new(),
            opacity: Vec::new(),
            z_offset: Vec::new(),
            effective_z: Vec::new(),
            natural_size: Vec::new(),
            snapshot: Vec::new(),
            redraw: Vec::new(),
            root_bounds: Rect::ZERO,
            epoch: Vec::new(),
            build_epoch: 0,
            widgets: Vec::new(),
            generation: Vec::new(),
            live: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            pending_removal: Vec::new(),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            redraw_rects: Vec::new(),
            root: INVALID,
            frame: FrameState::default(),
            layers: LayerSet::default(),
            focus: INVALID,
            detached: Vec::new(),
        };
        store.root = store.insert(root, INVALID).idx;
        store
    }

    // -- Allocation --

    /// Creates a detached node owned by `owner` and returns its handle.
    pub(crate) fn insert(&mut self, widget: Box<dyn Widget<S>>, owner: u32) -> NodeId {
        let z_offset = widget.z_offset();
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.children[i].clear();
            self.owner[i] = owner;
            self.position[i] = Point::ZERO;
            self.width[i] = None;
            self.height[i] = None;
            self.flags[i] = NodeFlags::default();
            self.opacity[i] = 1.0;
            self.z_offset[i] = z_offset;
            self.effective_z[i] = z_offset;
            self.natural_size[i] = Size::ZERO;
            self.snapshot[i].clear();
            self.redraw[i] = false;
            self.epoch[i] = 0;
            self.widgets[i] = Some(widget);
            self.live[i] = true;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.children.push(Vec::new());
            self.owner.push(owner);
            self.position.push(Point::ZERO);
            self.width.push(None);
            self.height.push(None);
            self.flags.push(NodeFlags::default());
            self.opacity.push(1.0);
            self.z_offset.push(z_offset);
            self.effective_z.push(z_offset);
            self.natural_size.push(Size::ZERO);
            self.snapshot.push(Vec::new());
            self.redraw.push(false);
            self.epoch.push(0);
            self.widgets.push(Some(widget));
            self.generation.push(0);
            self.live.push(true);
            idx
        };
        self.id_of(idx)
    }

    /// Queues a node for reclamation at the end of the next build pass.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or names the root.
    pub(crate) fn schedule_removal(&mut self, id: NodeId) {
        self.validate(id);
        assert!(id.idx != self.root, "cannot remove the root node");
        if !self.pending_removal.contains(&id.idx) {
            self.pending_removal.push(id.idx);
        }
    }

    /// Frees a slot. The node must already be detached.
    pub(crate) fn reclaim(&mut self, idx: u32) {
        let i = idx as usize;
        debug_assert!(self.children[i].is_empty(), "reclaiming an attached node");
        let id = self.id_of(idx);
        self.detached.push(id);
        if self.focus == idx {
            self.focus = INVALID;
        }
        self.dirty.remove_key(idx);
        self.widgets[i] = None;
        self.snapshot[i].clear();
        self.parent[i] = INVALID;
        self.owner[i] = INVALID;
        self.live[i] = false;
        // Bump generation so old handles immediately fail validation.
        self.generation[i] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.live[id.idx as usize]
    }

    /// Panics if `id` is stale.
    #[track_caller]
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(self.is_alive(id), "stale NodeId: {id:?}");
    }

    /// Returns the current handle for raw slot `idx`.
    pub(crate) fn id_of(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.live.iter().filter(|live| **live).count()
    }

    // -- Widget access --

    /// Runs `f` with the widget of `idx` moved out of its slot and a context
    /// whose current node is `idx`.
    ///
    /// # Panics
    ///
    /// Panics if the widget is already lent out, i.e. a hook re-entered its
    /// own node.
    pub(crate) fn with_widget<R>(
        &mut self,
        idx: u32,
        f: impl FnOnce(&mut dyn Widget<S>, &mut Context<'_, S>) -> R,
    ) -> R {
        self.natural_size[idx as usize] = self.natural_size_at(idx);
        let Some(mut widget) = self.widgets[idx as usize].take() else {
            panic!("widget of node {idx} is already in use");
        };
        let result = {
            let mut cx = Context::new(self, idx);
            f(widget.as_mut(), &mut cx)
        };
        self.widgets[idx as usize] = Some(widget);
        result
    }

    /// Returns the widget of `id` downcast to `T`.
    ///
    /// `None` if the type does not match or the widget is currently running a
    /// hook.
    pub(crate) fn widget<T: Widget<S>>(&self, id: NodeId) -> Option<&T> {
        self.validate(id);
        let widget: &dyn Any = self.widgets[id.idx as usize].as_deref()?;
        widget.downcast_ref()
    }

    /// Mutable counterpart of [`widget`](Self::widget).
    pub(crate) fn widget_mut<T: Widget<S>>(&mut self, id: NodeId) -> Option<&mut T> {
        self.validate(id);
        let widget: &mut dyn Any = self.widgets[id.idx as usize].as_deref_mut()?;
        widget.downcast_mut()
    }

    // -- Geometry --

    /// Returns the widget-reported size of `idx`, or the cached value while
    /// its widget is lent out.
    pub(crate) fn natural_size_at(&self, idx: u32) -> Size {
        if self.widgets[idx as usize].is_none() {
            return self.natural_size[idx as usize];
        }
        let parent = self.parent[idx as usize];
        let parent_size = if parent == INVALID {
            self.frame.viewport
        } else {
            self.size_at(parent)
        };
        self.measure(idx, parent_size)
    }

    /// Returns the size of `idx`: the override where set, else the natural size.
    pub(crate) fn size_at(&self, idx: u32) -> Size {
        let i = idx as usize;
        match (self.width[i], self.height[i]) {
            (Some(width), Some(height)) => Size::new(width, height),
            (width, height) => {
                let natural = self.natural_size_at(idx);
                Size::new(
                    width.unwrap_or(natural.width),
                    height.unwrap_or(natural.height),
                )
            }
        }
    }

    pub(crate) fn bounds_at(&self, idx: u32) -> Rect {
        Rect::from_origin_size(self.position[idx as usize], self.size_at(idx))
    }

    /// Returns the bounds of `idx` intersected with every ancestor's bounds.
    ///
    /// Sizes are resolved root-first along the ancestry, so each widget on
    /// the path is measured once.
    pub(crate) fn visible_bounds_at(&self, idx: u32) -> Rect {
        let mut path: Vec<u32> = self.ancestors_and_self(idx).collect();
        path.reverse();
        let mut parent_size = self.frame.viewport;
        let mut visible: Option<Rect> = None;
        for i in path {
            let size = self.size_within(i, parent_size);
            let bounds = Rect::from_origin_size(self.position[i as usize], size);
            visible = Some(visible.map_or(bounds, |v| v.intersect(bounds)));
            parent_size = size;
        }
        visible.unwrap_or(Rect::ZERO)
    }

    /// Size of `idx` given its parent's size.
    fn size_within(&self, idx: u32, parent_size: Size) -> Size {
        let i = idx as usize;
        if let (Some(width), Some(height)) = (self.width[i], self.height[i]) {
            return Size::new(width, height);
        }
        let natural = self.measure(idx, parent_size);
        Size::new(
            self.width[i].unwrap_or(natural.width),
            self.height[i].unwrap_or(natural.height),
        )
    }

    /// Asks the widget of `idx` for its natural size.
    fn measure(&self, idx: u32, parent_size: Size) -> Size {
        match self.widgets[idx as usize].as_deref() {
            Some(widget) => widget.natural_size(&SizeContext {
                parent_size,
                scale: self.frame.scale,
            }),
            None => self.natural_size[idx as usize],
        }
    }

    // -- Inherited state --

    /// Returns whether `idx` is reachable from the root through parent links.
    pub(crate) fn is_in_tree(&self, idx: u32) -> bool {
        let mut cur = idx;
        while cur != self.root {
            cur = self.parent[cur as usize];
            if cur == INVALID {
                return false;
            }
        }
        true
    }

    pub(crate) fn is_visible_at(&self, idx: u32) -> bool {
        self.ancestors_and_self(idx)
            .all(|i| !self.flags[i as usize].hidden)
    }

    pub(crate) fn is_enabled_at(&self, idx: u32) -> bool {
        self.ancestors_and_self(idx)
            .all(|i| !self.flags[i as usize].disabled)
    }

    /// Returns whether the effective z of `idx` differs from its parent's.
    ///
    /// Such a node paints outside its parent's layer and needs its own
    /// damage when the parent is redrawn.
    pub(crate) fn differs_from_parent_z(&self, idx: u32) -> bool {
        let p = self.parent[idx as usize];
        p != INVALID && self.effective_z[p as usize] != self.effective_z[idx as usize]
    }

    fn ancestors_and_self(&self, idx: u32) -> impl Iterator<Item = u32> + '_ {
        core::iter::successors(Some(idx), |&i| {
            let p = self.parent[i as usize];
            (p != INVALID).then_some(p)
        })
    }

    // -- Mutation (auto-requests redraw where appearance changes) --

    /// Marks `idx` for redraw; its descendants are reconsidered at damage time.
    pub(crate) fn request_redraw_at(&mut self, idx: u32) {
        self.redraw[idx as usize] = true;
        self.dirty.mark_with(idx, dirty::REDRAW, &EagerPolicy);
    }

    pub(crate) fn set_hidden(&mut self, idx: u32, hidden: bool) {
        if self.flags[idx as usize].hidden != hidden {
            self.flags[idx as usize].hidden = hidden;
            self.request_redraw_at(idx);
        }
    }

    pub(crate) fn set_disabled(&mut self, idx: u32, disabled: bool) {
        if self.flags[idx as usize].disabled != disabled {
            self.flags[idx as usize].disabled = disabled;
            self.request_redraw_at(idx);
        }
    }

    pub(crate) fn set_opacity(&mut self, idx: u32, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        if self.opacity[idx as usize] != opacity {
            self.opacity[idx as usize] = opacity;
            self.request_redraw_at(idx);
        }
    }

    /// Replaces the focused node, requesting redraw of both old and new.
    pub(crate) fn set_focus(&mut self, idx: u32) {
        if self.focus == idx {
            return;
        }
        let old = core::mem::replace(&mut self.focus, idx);
        if old != INVALID {
            self.request_redraw_at(old);
        }
        if idx != INVALID {
            self.request_redraw_at(idx);
        }
    }
}
