// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative grid layout for lamina widgets.
//!
//! `lamina_layout` turns a list of column and row [`TrackSize`]s plus a
//! bounding rectangle into a lazy sequence of `(index, Rect)` cells. It has
//! no knowledge of the widget tree: a widget's build hook typically zips the
//! cells with its children and appends each child at the cell's origin.
//!
//! ```
//! use kurbo::Rect;
//! use lamina_layout::{GridLayout, TrackSize};
//!
//! let widths = [TrackSize::Fixed(30), TrackSize::Flexible(1), TrackSize::Flexible(1)];
//! let grid = GridLayout {
//!     bounds: Rect::new(0.0, 0.0, 130.0, 20.0),
//!     widths: &widths,
//!     ..GridLayout::default()
//! };
//! let cells: Vec<f64> = grid.cell_bounds().map(|(_, r)| r.width()).collect();
//! assert_eq!(cells, [30.0, 50.0, 50.0]);
//! ```
//!
//! Track lengths are whole pixels. Flexible tracks share whatever the fixed
//! and max-content tracks leave over, in proportion to their weights; the
//! integer remainder goes one pixel at a time to the last flexible tracks
//! first.

mod grid;

pub use grid::{CellBounds, GridLayout, TrackSize};

/// Misuse of the layout API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// A max-content track needs every cell of the sequence to measure, so it
    /// cannot be used with an infinite, repeating layout.
    #[error("max-content tracks are not supported by a repeating layout")]
    MaxContentOnRepeating,
}
