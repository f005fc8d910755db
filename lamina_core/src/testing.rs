// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect, Size};

use crate::build::ChildAppender;
use crate::context::Context;
use crate::error::WidgetError;
use crate::node::NodeId;
use crate::surface::{Canvas, Surface};
use crate::widget::{CursorShape, HandleInputResult, SizeContext, Widget};

/// One recorded surface operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Clear(Rect),
    Composite { region: Rect, opacity: f32 },
    Fill(&'static str, Rect),
}

/// A surface that records what was done to it.
#[derive(Debug, Default)]
pub(crate) struct TestSurface {
    pub(crate) bounds: Rect,
    pub(crate) ops: Vec<Op>,
    pub(crate) allocations: usize,
}

impl TestSurface {
    pub(crate) fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }
}

impl Surface for TestSurface {
    fn allocate(&mut self, bounds: Rect) -> Self {
        self.allocations += 1;
        Self::new(bounds)
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn clear(&mut self, region: Rect) {
        self.ops.push(Op::Clear(region));
    }

    fn composite(&mut self, src: &Self, region: Rect, opacity: f32) {
        // Replay what was painted offscreen so tests can see it.
        self.ops.extend(src.ops.iter().cloned());
        self.ops.push(Op::Composite { region, opacity });
    }
}

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

/// A configurable widget.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub(crate) name: &'static str,
    pub(crate) log: Option<Log>,
    pub(crate) children: Vec<(NodeId, Point)>,
    pub(crate) sized_children: Vec<(NodeId, Point, Size)>,
    pub(crate) size: Option<Size>,
    pub(crate) z: i32,
    pub(crate) pointing: HandleInputResult,
    pub(crate) button: HandleInputResult,
    pub(crate) cursor: Option<CursorShape>,
    pub(crate) fail_build: bool,
    pub(crate) fail_update: bool,
    pub(crate) on_update: Option<fn(&mut Context<'_, TestSurface>)>,
}

impl Probe {
    pub(crate) fn named(name: &'static str, log: &Log) -> Self {
        Self {
            name,
            log: Some(log.clone()),
            ..Self::default()
        }
    }

    fn record(&self, event: &str) {
        if let Some(log) = &self.log {
            log.borrow_mut().push(format!("{event}:{}", self.name));
        }
    }
}

impl Widget<TestSurface> for Probe {
    fn build(
        &mut self,
        _cx: &mut Context<'_, TestSurface>,
        children: &mut ChildAppender,
    ) -> Result<(), WidgetError> {
        if self.fail_build {
            return Err("build failed".into());
        }
        for &(node, position) in &self.children {
            children.append(node, position);
        }
        for &(node, position, size) in &self.sized_children {
            children.append_sized(node, position, size);
        }
        Ok(())
    }

    fn handle_pointing_input(&mut self, _cx: &mut Context<'_, TestSurface>) -> HandleInputResult {
        self.record("pointing");
        self.pointing
    }

    fn handle_button_input(&mut self, _cx: &mut Context<'_, TestSurface>) -> HandleInputResult {
        self.record("button");
        self.button
    }

    fn update(&mut self, cx: &mut Context<'_, TestSurface>) -> Result<(), WidgetError> {
        if self.fail_update {
            return Err("update failed".into());
        }
        self.record("update");
        if let Some(on_update) = self.on_update {
            on_update(cx);
        }
        Ok(())
    }

    fn cursor_shape(&self, _cx: &Context<'_, TestSurface>) -> Option<CursorShape> {
        self.cursor
    }

    fn draw(&self, _cx: &Context<'_, TestSurface>, canvas: &mut Canvas<'_, TestSurface>) {
        self.record("draw");
        if !self.name.is_empty() {
            let clip = canvas.clip();
            canvas.surface().ops.push(Op::Fill(self.name, clip));
        }
    }

    fn z_offset(&self) -> i32 {
        self.z
    }

    fn natural_size(&self, cx: &SizeContext) -> Size {
        self.size.unwrap_or(cx.parent_size)
    }
}
