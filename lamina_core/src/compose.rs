// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layered, damage-clipped drawing with group opacity.
//!
//! Layers are painted from the lowest effective z to the highest. Each layer
//! pass walks the whole tree in child order, but only nodes whose effective z
//! equals the pass's z call their draw hook; everyone else is walked through
//! so their descendants on this layer get painted.
//!
//! A node is skipped together with its subtree when it is hidden, fully
//! transparent, or its visible bounds miss the damage region. When a node drawing on the
//! current layer has opacity below one, it and its descendants on the same
//! layer are painted into a cleared offscreen buffer covering the damage
//! region, which is then composited onto the target once with the node's
//! opacity. Overlapping children inside the group therefore never blend with
//! each other at partial alpha.

use kurbo::Rect;

use crate::buffers::BufferPool;
use crate::damage::is_empty_rect;
use crate::node::NodeStore;
use crate::surface::{Canvas, Surface};

/// Draws the damaged region onto `screen`.
///
/// `draw_index` counts draws and ages offscreen buffers.
pub(crate) fn draw_tree<S: Surface>(
    store: &mut NodeStore<S>,
    buffers: &mut BufferPool<S>,
    screen: &mut S,
    damage: Rect,
    draw_index: u64,
) {
    let root = store.root;
    for z in store.layers.to_vec() {
        let mut pass = Pass {
            store: &mut *store,
            buffers: &mut *buffers,
            damage,
            draw_index,
            z,
        };
        pass.draw_node(screen, root);
    }
}

struct Pass<'a, S: Surface> {
    store: &'a mut NodeStore<S>,
    buffers: &'a mut BufferPool<S>,
    damage: Rect,
    draw_index: u64,
    z: i32,
}

impl<S: Surface> Pass<'_, S> {
    fn draw_node(&mut self, dst: &mut S, idx: u32) {
        let i = idx as usize;
        if self.store.flags[i].hidden {
            return;
        }
        let opacity = self.store.opacity[i];
        if opacity <= 0.0 {
            return;
        }
        let visible = self.store.visible_bounds_at(idx);
        if is_empty_rect(visible.intersect(self.damage)) {
            return;
        }

        let on_layer = self.store.effective_z[i] == self.z;
        if on_layer && opacity < 1.0 {
            let node = self.store.id_of(idx);
            let mut lease = self.buffers.checkout(node, dst, self.damage);
            lease.surface.clear(self.damage);
            self.draw_subtree(&mut lease.surface, idx, visible, on_layer);
            dst.composite(&lease.surface, self.damage, opacity);
            self.buffers.checkin(node, lease, self.draw_index);
        } else {
            self.draw_subtree(dst, idx, visible, on_layer);
        }
    }

    fn draw_subtree(&mut self, dst: &mut S, idx: u32, visible: Rect, on_layer: bool) {
        if on_layer {
            let clip = visible.intersect(self.damage);
            if !is_empty_rect(clip) {
                self.store.with_widget(idx, |widget, cx| {
                    widget.draw(cx, &mut Canvas::new(&mut *dst, clip));
                });
            }
        }
        for k in 0..self.store.children[idx as usize].len() {
            let child = self.store.children[idx as usize][k];
            self.draw_node(dst, child);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Size};

    use super::*;
    use crate::node::NodeId;
    use crate::testing::{Op, Probe, TestSurface};

    fn square(name: &'static str, side: f64) -> Probe {
        Probe {
            name,
            size: Some(Size::new(side, side)),
            ..Probe::default()
        }
    }

    fn setup(children: Vec<(Probe, Point)>) -> (NodeStore<TestSurface>, Vec<NodeId>) {
        let mut store = NodeStore::new(Box::new(Probe {
            name: "root",
            ..Probe::default()
        }));
        store.frame.viewport = Size::new(100.0, 100.0);
        let root = store.id_of(store.root);
        let mut ids = Vec::new();
        for (widget, position) in children {
            let id = store.insert(Box::new(widget), root.idx);
            store
                .widget_mut::<Probe>(root)
                .unwrap()
                .children
                .push((id, position));
            ids.push(id);
        }
        store.build().unwrap();
        store.resolve_layers();
        (store, ids)
    }

    fn draw(store: &mut NodeStore<TestSurface>, damage: Rect) -> Vec<Op> {
        let mut screen = TestSurface::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut buffers = BufferPool::new(60);
        draw_tree(store, &mut buffers, &mut screen, damage, 1);
        screen.ops
    }

    const FULL: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    #[test]
    fn paints_layers_bottom_up_and_children_in_order() {
        let (mut store, _) = setup(vec![
            (
                Probe {
                    z: 5,
                    ..square("popup", 10.0)
                },
                Point::ZERO,
            ),
            (square("a", 10.0), Point::ZERO),
        ]);
        let fills: Vec<&str> = draw(&mut store, FULL)
            .into_iter()
            .filter_map(|op| match op {
                Op::Fill(name, _) => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(fills, vec!["root", "a", "popup"]);
    }

    #[test]
    fn draw_is_clipped_to_damage() {
        let (mut store, _) = setup(vec![(square("a", 50.0), Point::ZERO)]);
        let ops = draw(&mut store, Rect::new(40.0, 40.0, 60.0, 60.0));
        assert!(ops.contains(&Op::Fill("a", Rect::new(40.0, 40.0, 50.0, 50.0))));
        assert!(ops.contains(&Op::Fill("root", Rect::new(40.0, 40.0, 60.0, 60.0))));
    }

    #[test]
    fn nodes_outside_damage_are_not_drawn() {
        let (mut store, _) = setup(vec![(square("a", 10.0), Point::new(80.0, 80.0))]);
        let ops = draw(&mut store, Rect::new(0.0, 0.0, 20.0, 20.0));
        assert!(!ops.iter().any(|op| matches!(op, Op::Fill("a", _))));
    }

    #[test]
    fn translucent_node_outside_damage_takes_no_buffer() {
        let (mut store, ids) = setup(vec![(square("a", 10.0), Point::new(80.0, 80.0))]);
        store.set_opacity(ids[0].idx, 0.5);
        let mut screen = TestSurface::new(FULL);
        let mut buffers = BufferPool::new(60);
        draw_tree(
            &mut store,
            &mut buffers,
            &mut screen,
            Rect::new(0.0, 0.0, 20.0, 20.0),
            1,
        );
        assert_eq!(screen.allocations, 0);
        assert_eq!(buffers.len(), 0);
    }

    #[test]
    fn translucent_node_composites_its_group_once() {
        let (mut store, ids) = setup(vec![(square("a", 50.0), Point::ZERO)]);
        store.set_opacity(ids[0].idx, 0.5);
        let ops = draw(&mut store, FULL);
        let composites: Vec<_> = ops
            .iter()
            .filter(|op| matches!(op, Op::Composite { .. }))
            .collect();
        assert_eq!(
            composites,
            vec![&Op::Composite {
                region: FULL,
                opacity: 0.5
            }]
        );
    }

    #[test]
    fn hidden_and_transparent_nodes_are_skipped() {
        let (mut store, ids) = setup(vec![
            (square("a", 10.0), Point::ZERO),
            (square("b", 10.0), Point::ZERO),
        ]);
        store.set_hidden(ids[0].idx, true);
        store.set_opacity(ids[1].idx, 0.0);
        let ops = draw(&mut store, FULL);
        assert!(
            !ops.iter()
                .any(|op| matches!(op, Op::Fill("a" | "b", _) | Op::Composite { .. }))
        );
    }
}
