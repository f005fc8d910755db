// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid track resolution and the lazy cell sequence.

use core::fmt;
use core::iter::FusedIterator;

use kurbo::Rect;

use crate::LayoutError;

/// Sizing rule for one column or row.
#[derive(Clone, Copy)]
pub enum TrackSize<'a> {
    /// Exactly this many pixels, regardless of the available space.
    Fixed(u32),
    /// A share of the space left by the other tracks, proportional to the
    /// weight.
    Flexible(u32),
    /// The largest content length among the cells in this track. The closure
    /// maps a cell index to that cell's natural length.
    MaxContent(&'a dyn Fn(usize) -> u32),
}

impl fmt::Debug for TrackSize<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(px) => f.debug_tuple("Fixed").field(px).finish(),
            Self::Flexible(weight) => f.debug_tuple("Flexible").field(weight).finish(),
            Self::MaxContent(_) => f.write_str("MaxContent(..)"),
        }
    }
}

const DEFAULT_TRACKS: &[TrackSize<'static>] = &[TrackSize::Flexible(1)];

/// A grid of cells laid out inside `bounds`.
///
/// Empty `widths` or `heights` behave like a single `Flexible(1)` track.
/// Cells are numbered row-major: index `0` is the top-left cell, index
/// `widths.len()` starts the second row.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridLayout<'a> {
    /// The rectangle the tracks are fitted into.
    pub bounds: Rect,
    /// Column tracks, left to right.
    pub widths: &'a [TrackSize<'a>],
    /// Row tracks, top to bottom.
    pub heights: &'a [TrackSize<'a>],
    /// Horizontal space between adjacent columns.
    pub column_gap: u32,
    /// Vertical space between adjacent rows.
    pub row_gap: u32,
}

impl<'a> GridLayout<'a> {
    /// Returns the cells of a single pass over the grid: one per column and
    /// row combination.
    #[must_use]
    pub fn cell_bounds(&self) -> CellBounds<'a> {
        let count = self.widths().len() * self.heights().len();
        CellBounds::new(*self, Some(count))
    }

    /// Returns an endless sequence of cells, repeating the row tracks below
    /// the previous block of rows.
    ///
    /// # Panics
    ///
    /// Panics if any track is [`TrackSize::MaxContent`]. Use
    /// [`try_repeating_cell_bounds`](Self::try_repeating_cell_bounds) to get
    /// the error instead.
    #[must_use]
    pub fn repeating_cell_bounds(&self) -> CellBounds<'a> {
        match self.try_repeating_cell_bounds() {
            Ok(cells) => cells,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`repeating_cell_bounds`](Self::repeating_cell_bounds), but
    /// reports max-content tracks as an error.
    pub fn try_repeating_cell_bounds(&self) -> Result<CellBounds<'a>, LayoutError> {
        let has_max_content = self
            .widths()
            .iter()
            .chain(self.heights())
            .any(|track| matches!(track, TrackSize::MaxContent(_)));
        if has_max_content {
            return Err(LayoutError::MaxContentOnRepeating);
        }
        Ok(CellBounds::new(*self, None))
    }

    fn widths(&self) -> &'a [TrackSize<'a>] {
        if self.widths.is_empty() {
            DEFAULT_TRACKS
        } else {
            self.widths
        }
    }

    fn heights(&self) -> &'a [TrackSize<'a>] {
        if self.heights.is_empty() {
            DEFAULT_TRACKS
        } else {
            self.heights
        }
    }
}

/// Resolves the pixel length of every track along one axis into `out`.
///
/// `max_content` is asked for the length of each max-content track.
fn resolve_tracks(
    tracks: &[TrackSize<'_>],
    extent: f64,
    gap: u32,
    mut max_content: impl FnMut(usize, &dyn Fn(usize) -> u32) -> u32,
    out: &mut Vec<f64>,
) {
    out.clear();
    let gaps = f64::from(gap) * (tracks.len() - 1) as f64;
    let mut rest = (extent - gaps).max(0.0).floor();
    let mut denom = 0.0;

    for (i, track) in tracks.iter().enumerate() {
        let len = match *track {
            TrackSize::Fixed(px) => f64::from(px),
            TrackSize::Flexible(weight) => {
                denom += f64::from(weight);
                0.0
            }
            TrackSize::MaxContent(content) => f64::from(max_content(i, content)),
        };
        out.push(len);
        rest -= len;
    }

    if denom <= 0.0 {
        return;
    }

    let shared = rest.max(0.0);
    for (i, track) in tracks.iter().enumerate() {
        if let TrackSize::Flexible(weight) = *track {
            let len = (shared * f64::from(weight) / denom).floor();
            out[i] = len;
            rest -= len;
        }
    }

    // Whole pixels left over go to the last flexible tracks first.
    while rest >= 1.0 {
        for i in (0..tracks.len()).rev() {
            if !matches!(tracks[i], TrackSize::Flexible(_)) {
                continue;
            }
            out[i] += 1.0;
            rest -= 1.0;
            if rest < 1.0 {
                break;
            }
        }
    }
}

/// Lazy sequence of `(index, cell)` pairs produced by [`GridLayout`].
///
/// Finite for [`GridLayout::cell_bounds`], infinite for
/// [`GridLayout::repeating_cell_bounds`]. Calling either method again starts
/// a fresh sequence.
#[derive(Clone, Debug)]
pub struct CellBounds<'a> {
    layout: GridLayout<'a>,
    count: Option<usize>,
    widths: Vec<f64>,
    heights: Vec<f64>,
    next: usize,
    x: f64,
    y: f64,
}

impl<'a> CellBounds<'a> {
    fn new(layout: GridLayout<'a>, count: Option<usize>) -> Self {
        let tracks = layout.widths();
        let cols = tracks.len();
        let mut widths = Vec::with_capacity(cols);
        resolve_tracks(
            tracks,
            layout.bounds.width(),
            layout.column_gap,
            |col, content| {
                // Max-content is only reachable with a finite count.
                let count = count.unwrap_or(0);
                (col..count)
                    .step_by(cols)
                    .map(content)
                    .max()
                    .unwrap_or(0)
            },
            &mut widths,
        );
        Self {
            layout,
            count,
            widths,
            heights: Vec::with_capacity(layout.heights().len()),
            next: 0,
            x: layout.bounds.x0,
            y: layout.bounds.y0,
        }
    }

    /// Row lengths can depend on the cells of the current block, so they are
    /// resolved again at the start of every block.
    fn resolve_heights(&mut self, base: usize) {
        let cols = self.widths.len();
        let count = self.count;
        resolve_tracks(
            self.layout.heights(),
            self.layout.bounds.height(),
            self.layout.row_gap,
            |row, content| {
                let first = base + row * cols;
                (first..first + cols)
                    .take_while(|&idx| count.is_none_or(|count| idx < count))
                    .map(content)
                    .max()
                    .unwrap_or(0)
            },
            &mut self.heights,
        );
    }
}

impl Iterator for CellBounds<'_> {
    type Item = (usize, Rect);

    fn next(&mut self) -> Option<Self::Item> {
        if self.count.is_some_and(|count| self.next >= count) {
            return None;
        }

        let cols = self.widths.len();
        let rows = self.layout.heights().len();
        let in_block = self.next % (cols * rows);
        if in_block == 0 {
            self.resolve_heights(self.next);
        }

        let col = in_block % cols;
        let row = in_block / cols;
        let (w, h) = (self.widths[col], self.heights[row]);
        let cell = Rect::new(self.x, self.y, self.x + w, self.y + h);
        let index = self.next;
        self.next += 1;

        if col + 1 == cols {
            self.x = self.layout.bounds.x0;
            self.y += h + f64::from(self.layout.row_gap);
        } else {
            self.x += w + f64::from(self.layout.column_gap);
        }

        Some((index, cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.count {
            Some(count) => {
                let rest = count.saturating_sub(self.next);
                (rest, Some(rest))
            }
            None => (usize::MAX, None),
        }
    }
}

impl FusedIterator for CellBounds<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths_of(layout: &GridLayout<'_>) -> Vec<f64> {
        layout.cell_bounds().map(|(_, r)| r.width()).collect()
    }

    #[test]
    fn fixed_track_ignores_available_space() {
        let widths = [TrackSize::Fixed(50)];
        for available in [10.0, 50.0, 500.0] {
            let grid = GridLayout {
                bounds: Rect::new(0.0, 0.0, available, 10.0),
                widths: &widths,
                ..GridLayout::default()
            };
            assert_eq!(widths_of(&grid), [50.0], "available = {available}");
        }
    }

    #[test]
    fn single_flexible_fills_bounds() {
        let widths = [TrackSize::Flexible(1)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 101.0, 10.0),
            widths: &widths,
            ..GridLayout::default()
        };
        assert_eq!(widths_of(&grid), [101.0]);
    }

    #[test]
    fn remainder_goes_to_last_flexible_track() {
        let widths = [TrackSize::Flexible(1), TrackSize::Flexible(1)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 101.0, 10.0),
            widths: &widths,
            ..GridLayout::default()
        };
        assert_eq!(widths_of(&grid), [50.0, 51.0]);
    }

    #[test]
    fn fixed_then_flexible_columns() {
        let widths = [
            TrackSize::Fixed(30),
            TrackSize::Flexible(1),
            TrackSize::Flexible(1),
        ];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 130.0, 10.0),
            widths: &widths,
            ..GridLayout::default()
        };
        let cells: Vec<_> = grid.cell_bounds().collect();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], (0, Rect::new(0.0, 0.0, 30.0, 10.0)));
        assert_eq!(cells[1], (1, Rect::new(30.0, 0.0, 80.0, 10.0)));
        assert_eq!(cells[2], (2, Rect::new(80.0, 0.0, 130.0, 10.0)));
    }

    #[test]
    fn weights_are_proportional() {
        let widths = [TrackSize::Flexible(1), TrackSize::Flexible(3)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 100.0, 10.0),
            widths: &widths,
            ..GridLayout::default()
        };
        assert_eq!(widths_of(&grid), [25.0, 75.0]);
    }

    #[test]
    fn gaps_are_subtracted_before_sharing() {
        let widths = [TrackSize::Flexible(1), TrackSize::Flexible(1)];
        let grid = GridLayout {
            bounds: Rect::new(5.0, 0.0, 115.0, 10.0),
            widths: &widths,
            column_gap: 10,
            ..GridLayout::default()
        };
        let xs: Vec<_> = grid.cell_bounds().map(|(_, r)| (r.x0, r.x1)).collect();
        assert_eq!(xs, [(5.0, 55.0), (65.0, 115.0)]);
    }

    #[test]
    fn empty_tracks_yield_one_cell_covering_bounds() {
        let bounds = Rect::new(3.0, 4.0, 43.0, 24.0);
        let grid = GridLayout {
            bounds,
            ..GridLayout::default()
        };
        let cells: Vec<_> = grid.cell_bounds().collect();
        assert_eq!(cells, [(0, bounds)]);
    }

    #[test]
    fn cells_are_row_major() {
        let widths = [TrackSize::Flexible(1), TrackSize::Flexible(1)];
        let heights = [TrackSize::Fixed(20), TrackSize::Flexible(1)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
            widths: &widths,
            heights: &heights,
            row_gap: 4,
            ..GridLayout::default()
        };
        let cells: Vec<_> = grid.cell_bounds().map(|(_, r)| r).collect();
        assert_eq!(
            cells,
            [
                Rect::new(0.0, 0.0, 50.0, 20.0),
                Rect::new(50.0, 0.0, 100.0, 20.0),
                Rect::new(0.0, 24.0, 50.0, 100.0),
                Rect::new(50.0, 24.0, 100.0, 100.0),
            ]
        );
    }

    #[test]
    fn max_content_takes_largest_cell_in_track() {
        let sizes = [10, 30, 20, 5];
        let content = |idx: usize| sizes[idx];
        let widths = [TrackSize::MaxContent(&content), TrackSize::Flexible(1)];
        let heights = [TrackSize::Fixed(10), TrackSize::Fixed(10)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 100.0, 20.0),
            widths: &widths,
            heights: &heights,
            ..GridLayout::default()
        };
        // Column 0 holds cells 0 and 2.
        assert_eq!(widths_of(&grid), [20.0, 80.0, 20.0, 80.0]);
    }

    #[test]
    fn max_content_rows_measure_their_own_cells() {
        let sizes = [4, 9, 7, 2];
        let content = |idx: usize| sizes[idx];
        let widths = [TrackSize::Fixed(10), TrackSize::Fixed(10)];
        let heights = [TrackSize::MaxContent(&content), TrackSize::MaxContent(&content)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 20.0, 100.0),
            widths: &widths,
            heights: &heights,
            ..GridLayout::default()
        };
        let heights: Vec<_> = grid.cell_bounds().map(|(_, r)| r.height()).collect();
        assert_eq!(heights, [9.0, 9.0, 7.0, 7.0]);
    }

    #[test]
    fn repeating_layout_continues_below() {
        let widths = [TrackSize::Fixed(10)];
        let heights = [TrackSize::Fixed(5)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 10.0, 5.0),
            widths: &widths,
            heights: &heights,
            row_gap: 1,
            ..GridLayout::default()
        };
        let ys: Vec<_> = grid
            .repeating_cell_bounds()
            .take(4)
            .map(|(idx, r)| (idx, r.y0))
            .collect();
        assert_eq!(ys, [(0, 0.0), (1, 6.0), (2, 12.0), (3, 18.0)]);
    }

    #[test]
    fn repeating_layout_rejects_max_content() {
        let content = |_: usize| 3;
        let widths = [TrackSize::MaxContent(&content)];
        let grid = GridLayout {
            widths: &widths,
            ..GridLayout::default()
        };
        assert_eq!(
            grid.try_repeating_cell_bounds().err(),
            Some(LayoutError::MaxContentOnRepeating)
        );
    }

    #[test]
    #[should_panic(expected = "max-content tracks are not supported")]
    fn repeating_layout_with_max_content_panics() {
        let content = |_: usize| 3;
        let heights = [TrackSize::MaxContent(&content)];
        let grid = GridLayout {
            heights: &heights,
            ..GridLayout::default()
        };
        let _ = grid.repeating_cell_bounds();
    }

    #[test]
    fn sequence_is_restartable() {
        let widths = [TrackSize::Flexible(2), TrackSize::Fixed(7)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 64.0, 8.0),
            widths: &widths,
            ..GridLayout::default()
        };
        let first: Vec<_> = grid.cell_bounds().collect();
        let second: Vec<_> = grid.cell_bounds().collect();
        assert_eq!(first, second);
        assert_eq!(grid.cell_bounds().size_hint(), (2, Some(2)));
    }

    #[test]
    fn overcommitted_fixed_tracks_leave_flexible_empty() {
        let widths = [TrackSize::Fixed(80), TrackSize::Flexible(1)];
        let grid = GridLayout {
            bounds: Rect::new(0.0, 0.0, 50.0, 10.0),
            widths: &widths,
            ..GridLayout::default()
        };
        assert_eq!(widths_of(&grid), [80.0, 0.0]);
    }
}
