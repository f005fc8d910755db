// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input dispatch and cursor resolution.
//!
//! Layers are visited from the highest effective z to the lowest. Within a
//! layer the tree is walked depth-first with children in reverse order, so the
//! node painted last is asked first, and a node is asked only after all of its
//! descendants. Hidden nodes prune their whole subtree. The first node whose
//! hook does not return [`NotConsumed`](HandleInputResult::NotConsumed) ends
//! the dispatch.
//!
//! Dispatch does not look at bounds: widgets decide for themselves whether an
//! event concerns them, usually through
//! [`Context::is_hovered`](crate::Context::is_hovered).

use crate::node::{NodeId, NodeStore};
use crate::surface::Surface;
use crate::widget::{CursorShape, HandleInputResult};

/// The two input phases of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputKind {
    /// Pointer movement and wheel.
    Pointing,
    /// Buttons and keys.
    Button,
}

/// The node that stopped an input dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dispatch {
    /// The handling node.
    pub node: NodeId,
    /// `true` if the handler returned [`Aborted`](HandleInputResult::Aborted).
    pub aborted: bool,
}

impl<S: Surface> NodeStore<S> {
    /// Offers one input phase to the tree, returning the node that handled it.
    pub(crate) fn dispatch_input(&mut self, kind: InputKind) -> Option<Dispatch> {
        let root = self.root;
        self.layers
            .to_vec()
            .into_iter()
            .rev()
            .find_map(|z| self.dispatch_at(root, z, kind))
    }

    fn dispatch_at(&mut self, idx: u32, z: i32, kind: InputKind) -> Option<Dispatch> {
        if self.flags[idx as usize].hidden {
            return None;
        }
        let mut i = self.children[idx as usize].len();
        while i > 0 {
            i -= 1;
            let child = self.children[idx as usize][i];
            if let Some(dispatch) = self.dispatch_at(child, z, kind) {
                return Some(dispatch);
            }
        }
        if self.effective_z[idx as usize] != z {
            return None;
        }
        let result = self.with_widget(idx, |widget, cx| match kind {
            InputKind::Pointing => widget.handle_pointing_input(cx),
            InputKind::Button => widget.handle_button_input(cx),
        });
        match result {
            HandleInputResult::NotConsumed => None,
            HandleInputResult::Consumed => Some(Dispatch {
                node: self.id_of(idx),
                aborted: false,
            }),
            HandleInputResult::Aborted => Some(Dispatch {
                node: self.id_of(idx),
                aborted: true,
            }),
        }
    }

    /// Resolves the cursor shape: the first node in dispatch order whose
    /// visible bounds contain the pointer and which asks for a shape.
    pub(crate) fn resolve_cursor(&mut self) -> Option<CursorShape> {
        let root = self.root;
        self.layers
            .to_vec()
            .into_iter()
            .rev()
            .find_map(|z| self.cursor_at(root, z))
    }

    fn cursor_at(&mut self, idx: u32, z: i32) -> Option<CursorShape> {
        if self.flags[idx as usize].hidden {
            return None;
        }
        let mut i = self.children[idx as usize].len();
        while i > 0 {
            i -= 1;
            let child = self.children[idx as usize][i];
            if let Some(shape) = self.cursor_at(child, z) {
                return Some(shape);
            }
        }
        if self.effective_z[idx as usize] != z
            || !self.visible_bounds_at(idx).contains(self.frame.cursor)
        {
            return None;
        }
        self.with_widget(idx, |widget, cx| widget.cursor_shape(cx))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::{Point, Size};

    use super::*;
    use crate::testing::{Log, Probe, TestSurface};

    fn tree(log: &Log, widgets: Vec<Probe>) -> (NodeStore<TestSurface>, Vec<NodeId>) {
        let mut store = NodeStore::new(Box::new(Probe::named("root", log)));
        store.frame.viewport = Size::new(100.0, 100.0);
        let root = store.id_of(store.root);
        let ids: Vec<NodeId> = widgets
            .into_iter()
            .map(|w| store.insert(Box::new(w), root.idx))
            .collect();
        store
            .widget_mut::<Probe>(root)
            .unwrap()
            .children
            .extend(ids.iter().map(|&id| (id, Point::ZERO)));
        store.build().unwrap();
        store.resolve_layers();
        (store, ids)
    }

    #[test]
    fn later_sibling_is_asked_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, ids) = tree(
            &log,
            vec![
                Probe {
                    pointing: HandleInputResult::Consumed,
                    ..Probe::named("a", &log)
                },
                Probe {
                    pointing: HandleInputResult::Consumed,
                    ..Probe::named("b", &log)
                },
            ],
        );
        let dispatch = store.dispatch_input(InputKind::Pointing).unwrap();
        assert_eq!(dispatch.node, ids[1]);
        assert!(!dispatch.aborted);
        assert_eq!(*log.borrow(), vec!["pointing:b"]);
    }

    #[test]
    fn higher_layer_wins_regardless_of_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, ids) = tree(
            &log,
            vec![
                Probe {
                    z: 10,
                    button: HandleInputResult::Consumed,
                    ..Probe::named("popup", &log)
                },
                Probe {
                    button: HandleInputResult::Consumed,
                    ..Probe::named("page", &log)
                },
            ],
        );
        let dispatch = store.dispatch_input(InputKind::Button).unwrap();
        assert_eq!(dispatch.node, ids[0]);
    }

    #[test]
    fn unconsumed_input_reaches_the_root_last() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, _) = tree(&log, vec![Probe::named("a", &log), Probe::named("b", &log)]);
        assert_eq!(store.dispatch_input(InputKind::Pointing), None);
        assert_eq!(
            *log.borrow(),
            vec!["pointing:b", "pointing:a", "pointing:root"]
        );
    }

    #[test]
    fn hidden_subtree_is_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, ids) = tree(
            &log,
            vec![Probe {
                button: HandleInputResult::Consumed,
                ..Probe::named("a", &log)
            }],
        );
        store.set_hidden(ids[0].idx, true);
        assert_eq!(store.dispatch_input(InputKind::Button), None);
        assert_eq!(*log.borrow(), vec!["button:root"]);
    }

    #[test]
    fn abort_stops_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, ids) = tree(
            &log,
            vec![
                Probe {
                    pointing: HandleInputResult::Consumed,
                    ..Probe::named("a", &log)
                },
                Probe {
                    pointing: HandleInputResult::Aborted,
                    ..Probe::named("b", &log)
                },
            ],
        );
        let dispatch = store.dispatch_input(InputKind::Pointing).unwrap();
        assert_eq!(dispatch.node, ids[1]);
        assert!(dispatch.aborted);
    }

    #[test]
    fn cursor_requires_containment() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (mut store, _) = tree(
            &log,
            vec![Probe {
                size: Some(Size::new(10.0, 10.0)),
                cursor: Some(CursorShape::Pointer),
                ..Probe::named("a", &log)
            }],
        );
        store.frame.cursor = Point::new(5.0, 5.0);
        assert_eq!(store.resolve_cursor(), Some(CursorShape::Pointer));
        store.frame.cursor = Point::new(50.0, 50.0);
        assert_eq!(store.resolve_cursor(), None);
    }
}
