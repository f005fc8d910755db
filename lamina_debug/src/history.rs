// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recently repainted regions, for on-screen overlays.
//!
//! [`RedrawHistory`] listens for draw events and keeps each repainted
//! rectangle for a fixed number of subsequent draws. A host paints
//! [`RedrawHistory::regions`] on top of its frame to see what the runtime
//! actually repaints; the alpha fades linearly as a region ages.

use std::collections::VecDeque;

use kurbo::Rect;
use lamina_core::trace::{DrawEvent, TraceSink};

/// Default number of draws a region stays visible.
pub const DEFAULT_LIFETIME: u32 = 30;

#[derive(Clone, Copy, Debug)]
struct Region {
    rect: Rect,
    age: u32,
}

/// Remembers the rectangles of the last few draws.
#[derive(Clone, Debug)]
pub struct RedrawHistory {
    regions: VecDeque<Region>,
    lifetime: u32,
}

impl Default for RedrawHistory {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

impl RedrawHistory {
    /// Creates a history that keeps each region for `lifetime` draws.
    ///
    /// A lifetime of zero is treated as one.
    #[must_use]
    pub fn new(lifetime: u32) -> Self {
        Self {
            regions: VecDeque::new(),
            lifetime: lifetime.max(1),
        }
    }

    /// Records a repainted rectangle and ages every older one by a draw.
    pub fn record(&mut self, rect: Rect) {
        for region in &mut self.regions {
            region.age += 1;
        }
        while self
            .regions
            .front()
            .is_some_and(|r| r.age >= self.lifetime)
        {
            self.regions.pop_front();
        }
        self.regions.push_back(Region { rect, age: 0 });
    }

    /// Returns remembered regions, oldest first, with their overlay alpha.
    ///
    /// The newest region has alpha 1.0; alpha falls towards zero as the
    /// region approaches its lifetime.
    pub fn regions(&self) -> impl Iterator<Item = (Rect, f32)> + '_ {
        let lifetime = f64::from(self.lifetime);
        self.regions.iter().map(move |r| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "alpha is in 0..=1"
            )]
            let alpha = (1.0 - f64::from(r.age) / lifetime) as f32;
            (r.rect, alpha)
        })
    }

    /// Number of remembered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` when nothing has been drawn recently.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Forgets every region.
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

impl TraceSink for RedrawHistory {
    fn on_draw(&mut self, e: &DrawEvent) {
        self.record(e.rect);
    }
}
