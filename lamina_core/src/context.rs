// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The handle widget hooks use to read and modify the tree.

use kurbo::{Point, Rect, Size};

use crate::layers::LayerSet;
use crate::node::{Children, INVALID, NodeFlags, NodeId, NodeStore};
use crate::surface::Surface;
use crate::widget::Widget;

/// Access to the node tree from inside a widget hook.
///
/// Every method taking a [`NodeId`] panics if the handle is stale.
///
/// Hidden, enabled and opacity changes request a redraw of the node
/// automatically. Position and size changes do not need to: they are caught by
/// comparing each parent's children against the previous frame.
#[derive(Debug)]
pub struct Context<'a, S: Surface> {
    store: &'a mut NodeStore<S>,
    current: u32,
}

impl<'a, S: Surface> Context<'a, S> {
    pub(crate) fn new(store: &'a mut NodeStore<S>, current: u32) -> Self {
        Self { store, current }
    }

    // -- Frame --

    /// The node whose hook is running.
    #[must_use]
    pub fn current(&self) -> NodeId {
        self.store.id_of(self.current)
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.store.id_of(self.store.root)
    }

    /// Monotonic frame counter, starting at 1 for the first update.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.store.frame.index
    }

    /// Size of the window's content area.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.store.frame.viewport
    }

    /// Device scale times application scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.store.frame.scale
    }

    /// Pointer position for this frame.
    #[must_use]
    pub fn cursor_position(&self) -> Point {
        self.store.frame.cursor
    }

    /// Distinct effective z values, as resolved by the latest update.
    #[must_use]
    pub fn layers(&self) -> &LayerSet {
        &self.store.layers
    }

    // -- Ownership --

    /// Creates a detached node owned by the current node.
    ///
    /// The node joins the tree once some build hook appends it.
    pub fn insert<W: Widget<S>>(&mut self, widget: W) -> NodeId {
        self.store.insert(Box::new(widget), self.current)
    }

    /// Removes `id` and every node it owns.
    ///
    /// Reclamation happens at the end of the next build pass in which the
    /// node is not appended; the handle stays valid until then.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or names the root.
    pub fn remove(&mut self, id: NodeId) {
        self.store.schedule_removal(id);
    }

    /// Returns whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.store.is_alive(id)
    }

    /// Returns the widget of `id` if it is a `T`.
    ///
    /// Always `None` for the current node.
    #[must_use]
    pub fn widget<T: Widget<S>>(&self, id: NodeId) -> Option<&T> {
        self.store.widget(id)
    }

    /// Mutable counterpart of [`widget`](Self::widget).
    pub fn widget_mut<T: Widget<S>>(&mut self, id: NodeId) -> Option<&mut T> {
        self.store.widget_mut(id)
    }

    // -- Topology --

    /// The node's parent in the current tree, if attached.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.store.validate(id);
        let p = self.store.parent[id.idx as usize];
        (p != INVALID).then(|| self.store.id_of(p))
    }

    /// The node's children, in paint order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.store.validate(id);
        Children::new(
            &self.store.generation,
            &self.store.children[id.idx as usize],
        )
    }

    /// Returns whether `id` is reachable from the root.
    #[must_use]
    pub fn is_in_tree(&self, id: NodeId) -> bool {
        self.store.validate(id);
        self.store.is_in_tree(id.idx)
    }

    // -- Geometry --

    /// Top-left corner in window coordinates.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.store.validate(id);
        self.store.position[id.idx as usize]
    }

    /// Moves a node. Usually set through the
    /// [`ChildAppender`](crate::ChildAppender) instead.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.store.validate(id);
        self.store.position[id.idx as usize] = position;
    }

    /// The node's size: the override where set, else its natural size.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Size {
        self.store.validate(id);
        self.store.size_at(id.idx)
    }

    /// The size the widget reports for itself, ignoring any override.
    #[must_use]
    pub fn natural_size(&self, id: NodeId) -> Size {
        self.store.validate(id);
        self.store.natural_size_at(id.idx)
    }

    /// Overrides both dimensions.
    pub fn set_size(&mut self, id: NodeId, size: Size) {
        self.store.validate(id);
        self.store.width[id.idx as usize] = Some(size.width);
        self.store.height[id.idx as usize] = Some(size.height);
    }

    /// Overrides the width only.
    pub fn set_width(&mut self, id: NodeId, width: f64) {
        self.store.validate(id);
        self.store.width[id.idx as usize] = Some(width);
    }

    /// Overrides the height only.
    pub fn set_height(&mut self, id: NodeId, height: f64) {
        self.store.validate(id);
        self.store.height[id.idx as usize] = Some(height);
    }

    /// Drops any size override.
    pub fn clear_size(&mut self, id: NodeId) {
        self.store.validate(id);
        self.store.width[id.idx as usize] = None;
        self.store.height[id.idx as usize] = None;
    }

    /// Position and size as a rectangle.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.store.validate(id);
        self.store.bounds_at(id.idx)
    }

    /// Bounds intersected with every ancestor's bounds.
    #[must_use]
    pub fn visible_bounds(&self, id: NodeId) -> Rect {
        self.store.validate(id);
        self.store.visible_bounds_at(id.idx)
    }

    // -- Appearance --

    /// The node's own flags, ignoring ancestors.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.store.validate(id);
        self.store.flags[id.idx as usize]
    }

    /// `false` if the node or any ancestor is hidden.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.store.validate(id);
        self.store.is_visible_at(id.idx)
    }

    /// Hides or shows the node and its subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        self.store.validate(id);
        self.store.set_hidden(id.idx, !visible);
    }

    /// `false` if the node or any ancestor is disabled.
    #[must_use]
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.store.validate(id);
        self.store.is_enabled_at(id.idx)
    }

    /// Enables or disables input for the node and its subtree.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        self.store.validate(id);
        self.store.set_disabled(id.idx, !enabled);
    }

    /// The node's own opacity, not multiplied with its ancestors'.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f32 {
        self.store.validate(id);
        self.store.opacity[id.idx as usize]
    }

    /// Sets the node's opacity, clamped to `[0, 1]`. The whole subtree is
    /// blended as one group.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) {
        self.store.validate(id);
        self.store.set_opacity(id.idx, opacity);
    }

    /// Effective z as resolved by the latest update.
    #[must_use]
    pub fn effective_z(&self, id: NodeId) -> i32 {
        self.store.validate(id);
        self.store.effective_z[id.idx as usize]
    }

    // -- Hit testing --

    /// Returns whether `point` would reach `id`, given everything painted
    /// above it.
    #[must_use]
    pub fn is_hit_at(&self, id: NodeId, point: Point) -> bool {
        self.store.validate(id);
        self.store.is_hit_at(id.idx, point)
    }

    /// [`is_hit_at`](Self::is_hit_at) for the current cursor position.
    #[must_use]
    pub fn is_hovered(&self, id: NodeId) -> bool {
        self.is_hit_at(id, self.store.frame.cursor)
    }

    // -- Redraw --

    /// Asks for the node's visible bounds to be repainted.
    ///
    /// Descendants painting on another layer are repainted as well.
    pub fn request_redraw(&mut self, id: NodeId) {
        self.store.validate(id);
        self.store.request_redraw_at(id.idx);
    }

    /// Asks for an arbitrary window region to be repainted.
    pub fn request_redraw_rect(&mut self, rect: Rect) {
        self.store.redraw_rects.push(rect);
    }

    // -- Focus --

    /// Moves keyboard focus to `id`.
    pub fn focus(&mut self, id: NodeId) {
        self.store.validate(id);
        self.store.set_focus(id.idx);
    }

    /// Clears keyboard focus.
    pub fn blur(&mut self) {
        self.store.set_focus(INVALID);
    }

    /// The focused node, if any.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        let focus = self.store.focus;
        (focus != INVALID).then(|| self.store.id_of(focus))
    }

    /// Returns whether `id` holds keyboard focus.
    #[must_use]
    pub fn is_focused(&self, id: NodeId) -> bool {
        self.store.validate(id);
        self.store.focus == id.idx
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size};

    use super::Context;
    use crate::damage::{Contribution, DamageCause};
    use crate::node::{NodeId, NodeStore};
    use crate::testing::{Probe, TestSurface};

    fn store() -> NodeStore<TestSurface> {
        let mut store = NodeStore::new(Box::new(Probe::default()));
        store.frame.viewport = Size::new(100.0, 100.0);
        store
    }

    /// Inserts a sized node and appends it to `parent` on the next build.
    fn attach(
        store: &mut NodeStore<TestSurface>,
        parent: NodeId,
        size: Size,
        position: Point,
    ) -> NodeId {
        let id = store.insert(
            Box::new(Probe {
                size: Some(size),
                ..Probe::default()
            }),
            parent.idx,
        );
        store
            .widget_mut::<Probe>(parent)
            .unwrap()
            .children
            .push((id, position));
        id
    }

    fn settle(store: &mut NodeStore<TestSurface>) {
        store.build().unwrap();
        store.resolve_layers();
    }

    // -- Focus --

    #[test]
    fn focusing_a_node_unfocuses_the_previous_one() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::ZERO);
        let b = attach(&mut store, root, Size::new(10.0, 10.0), Point::new(20.0, 0.0));
        settle(&mut store);

        let mut cx = Context::new(&mut store, root.idx);
        cx.focus(a);
        assert!(cx.is_focused(a));
        cx.focus(b);
        assert_eq!(cx.focused(), Some(b));
        assert!(!cx.is_focused(a));
        assert!(store.redraw[a.idx as usize], "losing focus repaints");
        assert!(store.redraw[b.idx as usize]);
    }

    #[test]
    fn blur_without_focus_changes_nothing() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::ZERO);
        settle(&mut store);

        let before = store.redraw.clone();
        let mut cx = Context::new(&mut store, root.idx);
        cx.blur();
        assert_eq!(cx.focused(), None);
        assert!(!cx.is_focused(a));
        assert_eq!(store.redraw, before);

        let mut cx = Context::new(&mut store, root.idx);
        cx.focus(a);
        cx.blur();
        assert_eq!(cx.focused(), None);
    }

    #[test]
    fn focus_is_dropped_when_the_node_leaves_the_tree() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::ZERO);
        settle(&mut store);
        Context::new(&mut store, root.idx).focus(a);

        store.widget_mut::<Probe>(root).unwrap().children.clear();
        settle(&mut store);
        let cx = Context::new(&mut store, root.idx);
        assert!(cx.is_alive(a));
        assert_eq!(cx.focused(), None);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn stale_handle_cannot_take_focus() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = store.insert(Box::new(Probe::default()), root.idx);
        store.reclaim(a.idx);
        Context::new(&mut store, root.idx).focus(a);
    }

    // -- Appearance --

    #[test]
    fn opacity_is_clamped() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::ZERO);
        settle(&mut store);

        let mut cx = Context::new(&mut store, root.idx);
        cx.set_opacity(a, 1.5);
        assert_eq!(cx.opacity(a), 1.0);
        cx.set_opacity(a, -1.0);
        assert_eq!(cx.opacity(a), 0.0);
        cx.set_opacity(a, 0.25);
        assert_eq!(cx.opacity(a), 0.25);
    }

    #[test]
    fn appearance_changes_damage_the_node() {
        let setters: [fn(&mut Context<'_, TestSurface>, NodeId); 3] = [
            |cx, id| cx.set_enabled(id, false),
            |cx, id| cx.set_visible(id, false),
            |cx, id| cx.set_opacity(id, 0.5),
        ];
        for set in setters {
            let mut store = store();
            let root = store.id_of(store.root);
            let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::new(20.0, 20.0));
            settle(&mut store);
            let mut out = Vec::new();
            store.collect_damage(true, &mut out);

            set(&mut Context::new(&mut store, root.idx), a);
            out.clear();
            store.collect_damage(false, &mut out);
            assert_eq!(
                out,
                vec![Contribution {
                    cause: DamageCause::Request,
                    node: Some(a),
                    rect: Rect::new(20.0, 20.0, 30.0, 30.0),
                }]
            );
        }
    }

    #[test]
    fn unchanged_appearance_requests_nothing() {
        let mut store = store();
        let root = store.id_of(store.root);
        let a = attach(&mut store, root, Size::new(10.0, 10.0), Point::ZERO);
        settle(&mut store);

        let mut cx = Context::new(&mut store, root.idx);
        cx.set_enabled(a, true);
        cx.set_visible(a, true);
        cx.set_opacity(a, 1.0);
        assert!(!store.redraw[a.idx as usize]);
    }

    // -- Hit testing --

    #[test]
    fn hover_respects_the_parent_clip() {
        let mut store = store();
        let root = store.id_of(store.root);
        let panel = attach(&mut store, root, Size::new(50.0, 50.0), Point::ZERO);
        let item = attach(&mut store, panel, Size::new(20.0, 20.0), Point::new(40.0, 40.0));
        settle(&mut store);

        store.frame.cursor = Point::new(55.0, 55.0);
        let cx = Context::new(&mut store, root.idx);
        assert!(cx.bounds(item).contains(Point::new(55.0, 55.0)));
        assert!(!cx.is_hovered(item));

        store.frame.cursor = Point::new(45.0, 45.0);
        assert!(Context::new(&mut store, root.idx).is_hovered(item));
    }
}
