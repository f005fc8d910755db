// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The widget trait and the small value types its hooks exchange.

use core::any::Any;

use kurbo::Size;

use crate::build::ChildAppender;
use crate::context::Context;
use crate::error::WidgetError;
use crate::surface::{Canvas, Surface};

/// Outcome of an input hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HandleInputResult {
    /// Pass the event on to the next candidate.
    #[default]
    NotConsumed,
    /// Stop dispatch; this node handled the event.
    Consumed,
    /// Stop dispatch and report that the interaction was cancelled.
    Aborted,
}

/// Mouse cursor shapes a widget can ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CursorShape {
    /// The platform's default arrow.
    #[default]
    Default,
    /// Text insertion beam.
    Text,
    /// Precise selection crosshair.
    Crosshair,
    /// Pointing hand, for links and buttons.
    Pointer,
    /// Horizontal resize.
    EwResize,
    /// Vertical resize.
    NsResize,
    /// Diagonal resize, north-east to south-west.
    NeswResize,
    /// Diagonal resize, north-west to south-east.
    NwseResize,
    /// Move.
    Move,
    /// The action is not allowed.
    NotAllowed,
}

/// Inputs to [`Widget::natural_size`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeContext {
    /// Size of the parent node, or the viewport for the root and for
    /// detached nodes.
    pub parent_size: Size,
    /// Device scale times application scale.
    pub scale: f64,
}

/// A node's behavior.
///
/// Every hook has a default: a plain `impl Widget<S> for T {}` is a
/// transparent container that fills its parent, has no children, ignores
/// input and draws nothing.
///
/// While a hook runs, the widget is moved out of its node. Looking up the
/// current node's widget through the [`Context`] therefore yields `None`;
/// use `self` instead.
pub trait Widget<S: Surface>: Any {
    /// Declares this node's children for the current frame.
    ///
    /// Called top-down once or twice per update. Children appended here are
    /// built next, in order. Nodes appended in the previous pass but not this
    /// one are detached.
    fn build(
        &mut self,
        cx: &mut Context<'_, S>,
        children: &mut ChildAppender,
    ) -> Result<(), WidgetError> {
        let _ = (cx, children);
        Ok(())
    }

    /// Pointer movement and wheel input.
    fn handle_pointing_input(&mut self, cx: &mut Context<'_, S>) -> HandleInputResult {
        let _ = cx;
        HandleInputResult::NotConsumed
    }

    /// Button and key input.
    fn handle_button_input(&mut self, cx: &mut Context<'_, S>) -> HandleInputResult {
        let _ = cx;
        HandleInputResult::NotConsumed
    }

    /// Per-frame state update, after input and the second build pass.
    fn update(&mut self, cx: &mut Context<'_, S>) -> Result<(), WidgetError> {
        let _ = cx;
        Ok(())
    }

    /// Cursor wanted while the pointer is over this node. `None` defers to
    /// the nodes below.
    fn cursor_shape(&self, cx: &Context<'_, S>) -> Option<CursorShape> {
        let _ = cx;
        None
    }

    /// Paints this node. Children are painted afterwards, on top.
    fn draw(&self, cx: &Context<'_, S>, canvas: &mut Canvas<'_, S>) {
        let _ = (cx, canvas);
    }

    /// Offset added to the parent's effective z.
    fn z_offset(&self) -> i32 {
        0
    }

    /// Size used when the node has no explicit size override.
    fn natural_size(&self, cx: &SizeContext) -> Size {
        cx.parent_size
    }
}
