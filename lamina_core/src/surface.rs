// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing backend seam.
//!
//! The runtime never touches pixels itself. It needs exactly four things from
//! a backend: allocating an offscreen surface compatible with the screen,
//! asking a surface for its bounds, clearing a region, and compositing one
//! surface onto another with a uniform opacity. Everything else (paths,
//! text, images) is between the widgets and their concrete surface type,
//! reached through [`Canvas::surface`].

use kurbo::Rect;

/// A 2D pixel target.
///
/// Coordinates are in device pixels in the screen's space: an offscreen
/// surface allocated for `bounds` is addressed with the same coordinates as
/// the region of the screen it stands in for.
pub trait Surface: Sized + 'static {
    /// Allocates a transparent surface covering `bounds`, compatible with `self`.
    #[must_use]
    fn allocate(&mut self, bounds: Rect) -> Self;

    /// Returns the region this surface covers.
    fn bounds(&self) -> Rect;

    /// Resets `region` to fully transparent.
    fn clear(&mut self, region: Rect);

    /// Composites `region` of `src` onto `self` (source-over) with every
    /// pixel's alpha multiplied by `opacity`.
    fn composite(&mut self, src: &Self, region: Rect, opacity: f32);
}

/// A surface handed to [`Widget::draw`](crate::Widget::draw), restricted to
/// the node's visible bounds within the current damage region.
///
/// Widgets must not paint outside [`clip`](Self::clip); the runtime relies on
/// it for partial redraw.
#[derive(Debug)]
pub struct Canvas<'a, S> {
    surface: &'a mut S,
    clip: Rect,
}

impl<'a, S: Surface> Canvas<'a, S> {
    pub(crate) fn new(surface: &'a mut S, clip: Rect) -> Self {
        Self { surface, clip }
    }

    /// The rectangle this draw call may touch.
    #[must_use]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// The target surface.
    pub fn surface(&mut self) -> &mut S {
        &mut *self.surface
    }
}
