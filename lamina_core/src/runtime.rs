// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame driver.

use kurbo::{Point, Rect, Size};

use crate::buffers::BufferPool;
use crate::compose;
use crate::context::Context;
use crate::damage::{Contribution, DamageRegion, is_empty_rect};
use crate::error::FrameError;
use crate::input::{Dispatch, InputKind};
use crate::layers::LayerSet;
use crate::node::{FrameState, NodeId, NodeStore};
use crate::options::RuntimeOptions;
use crate::surface::Surface;
use crate::trace::{
    DamageEvent, DrawEvent, FrameSummary, InputEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind,
    Tracer,
};
use crate::widget::{CursorShape, Widget};

/// What the host reports at the start of each update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Size of the window's content area.
    pub viewport: Size,
    /// Device pixel ratio.
    pub device_scale: f64,
    /// Pointer position in window coordinates.
    pub cursor_position: Point,
}

impl FrameInput {
    /// Input for a window of the given size at scale one, pointer at the origin.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            device_scale: 1.0,
            cursor_position: Point::ZERO,
        }
    }

    /// Replaces the pointer position.
    #[must_use]
    pub fn with_cursor(mut self, cursor_position: Point) -> Self {
        self.cursor_position = cursor_position;
        self
    }

    /// Replaces the device scale.
    #[must_use]
    pub fn with_device_scale(mut self, device_scale: f64) -> Self {
        self.device_scale = device_scale;
        self
    }
}

impl Default for FrameInput {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

/// What an update decided.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameOutcome {
    /// The node that handled pointing input, if any.
    pub pointing: Option<Dispatch>,
    /// The node that handled button input, if any.
    pub button: Option<Dispatch>,
    /// Cursor shape the host should apply; `None` means the default.
    pub cursor: Option<CursorShape>,
}

/// Owns the widget tree and drives it one frame at a time.
///
/// Call [`update`](Self::update) once per host tick and
/// [`draw`](Self::draw) whenever the host is ready to paint. An update runs,
/// in order: a build pass, pointing then button dispatch, a second build
/// pass, cursor resolution, update hooks, z resolution and damage
/// collection.
///
/// # Example
///
/// ```
/// use kurbo::{Point, Rect, Size};
/// use lamina_core::{
///     Canvas, ChildAppender, Context, FrameInput, NodeId, Runtime, RuntimeOptions, SizeContext,
///     Surface, Widget, WidgetError,
/// };
///
/// struct Screen {
///     bounds: Rect,
///     fills: usize,
/// }
///
/// impl Surface for Screen {
///     fn allocate(&mut self, bounds: Rect) -> Self {
///         Self { bounds, fills: 0 }
///     }
///     fn bounds(&self) -> Rect {
///         self.bounds
///     }
///     fn clear(&mut self, _region: Rect) {}
///     fn composite(&mut self, src: &Self, _region: Rect, _opacity: f32) {
///         self.fills += src.fills;
///     }
/// }
///
/// struct Swatch;
///
/// impl Widget<Screen> for Swatch {
///     fn natural_size(&self, _cx: &SizeContext) -> Size {
///         Size::new(20.0, 20.0)
///     }
///     fn draw(&self, _cx: &Context<'_, Screen>, canvas: &mut Canvas<'_, Screen>) {
///         canvas.surface().fills += 1;
///     }
/// }
///
/// struct Root {
///     swatch: Option<NodeId>,
/// }
///
/// impl Widget<Screen> for Root {
///     fn build(
///         &mut self,
///         cx: &mut Context<'_, Screen>,
///         children: &mut ChildAppender,
///     ) -> Result<(), WidgetError> {
///         let swatch = *self.swatch.get_or_insert_with(|| cx.insert(Swatch));
///         children.append(swatch, Point::new(10.0, 10.0));
///         Ok(())
///     }
/// }
///
/// let mut runtime = Runtime::new(Root { swatch: None }, RuntimeOptions::default());
/// let mut screen = Screen {
///     bounds: Rect::new(0.0, 0.0, 100.0, 100.0),
///     fills: 0,
/// };
///
/// runtime.update(&FrameInput::new(Size::new(100.0, 100.0)))?;
/// assert!(runtime.draw(&mut screen));
/// assert_eq!(screen.fills, 1);
///
/// // Nothing changed, so there is nothing to draw.
/// runtime.update(&FrameInput::new(Size::new(100.0, 100.0)))?;
/// assert!(!runtime.draw(&mut screen));
/// # Ok::<(), lamina_core::FrameError>(())
/// ```
#[derive(Debug)]
pub struct Runtime<S: Surface> {
    store: NodeStore<S>,
    buffers: BufferPool<S>,
    damage: DamageRegion,
    options: RuntimeOptions,
    /// Viewport and scale of the last successful update.
    last_frame: Option<(Size, f64)>,
    /// Set by a successful update, cleared when an update starts.
    drawable: bool,
    /// Draws that painted something; ages offscreen buffers.
    draws: u64,
    contributions: Vec<Contribution>,
}

impl<S: Surface> Runtime<S> {
    /// Creates a runtime whose tree starts at `root`.
    pub fn new(root: impl Widget<S>, options: RuntimeOptions) -> Self {
        Self {
            store: NodeStore::new(Box::new(root)),
            buffers: BufferPool::new(options.buffer_idle_frames),
            damage: DamageRegion::None,
            options,
            last_frame: None,
            drawable: false,
            draws: 0,
            contributions: Vec::new(),
        }
    }

    // -- Queries --

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.store.id_of(self.store.root)
    }

    /// Index of the latest update, starting at 1.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.store.frame.index
    }

    /// The options this runtime was created with.
    #[must_use]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Damage accumulated since the last draw.
    #[must_use]
    pub fn damage(&self) -> DamageRegion {
        self.damage
    }

    /// Distinct effective z values in the tree.
    #[must_use]
    pub fn layers(&self) -> &LayerSet {
        &self.store.layers
    }

    /// Live nodes, attached or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    /// Offscreen buffers currently held.
    #[must_use]
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Returns whether `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.store.is_alive(id)
    }

    /// Returns whether `id` is reachable from the root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_in_tree(&self, id: NodeId) -> bool {
        self.store.validate(id);
        self.store.is_in_tree(id.idx)
    }

    /// Bounds of `id` in window coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.store.validate(id);
        self.store.bounds_at(id.idx)
    }

    /// Bounds of `id` clipped by its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn visible_bounds(&self, id: NodeId) -> Rect {
        self.store.validate(id);
        self.store.visible_bounds_at(id.idx)
    }

    /// Effective z of `id` as of the latest update.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn effective_z(&self, id: NodeId) -> i32 {
        self.store.validate(id);
        self.store.effective_z[id.idx as usize]
    }

    /// Returns whether `id` is the topmost node at `point`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn is_hit_at(&self, id: NodeId, point: Point) -> bool {
        self.store.validate(id);
        self.store.is_hit_at(id.idx, point)
    }

    /// Returns the widget of `id` if it is a `T`.
    #[must_use]
    pub fn widget<T: Widget<S>>(&self, id: NodeId) -> Option<&T> {
        self.store.widget(id)
    }

    /// Mutable counterpart of [`widget`](Self::widget).
    ///
    /// Changes made here are picked up by the next update; request a redraw
    /// through [`context`](Self::context) if the change is visual.
    pub fn widget_mut<T: Widget<S>>(&mut self, id: NodeId) -> Option<&mut T> {
        self.store.widget_mut(id)
    }

    // -- Mutation outside hooks --

    /// Creates a detached node owned by the root.
    pub fn insert(&mut self, widget: impl Widget<S>) -> NodeId {
        let root = self.store.root;
        self.store.insert(Box::new(widget), root)
    }

    /// A context positioned at the root, for host-side tree operations
    /// between frames.
    pub fn context(&mut self) -> Context<'_, S> {
        let root = self.store.root;
        Context::new(&mut self.store, root)
    }

    /// Damages the whole viewport on the next update, for example after the
    /// host has lost the contents of its screen surface.
    pub fn request_redraw_all(&mut self) {
        self.last_frame = None;
    }

    // -- Frame pipeline --

    /// Runs one update. See [`update_traced`](Self::update_traced).
    ///
    /// # Errors
    ///
    /// Returns the first hook failure; see [`FrameError`].
    pub fn update(&mut self, input: &FrameInput) -> Result<FrameOutcome, FrameError> {
        self.update_traced(input, &mut Tracer::none())
    }

    /// Runs one update, reporting each stage to `tracer`.
    ///
    /// On error the rest of the update is skipped, damage already accumulated
    /// is kept, and [`draw`](Self::draw) does nothing until an update
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure; see [`FrameError`].
    pub fn update_traced(
        &mut self,
        input: &FrameInput,
        tracer: &mut Tracer<'_>,
    ) -> Result<FrameOutcome, FrameError> {
        self.drawable = false;
        let frame_index = self.store.frame.index + 1;
        self.store.frame = FrameState {
            index: frame_index,
            viewport: input.viewport,
            scale: input.device_scale * self.options.app_scale,
            cursor: input.cursor_position,
        };

        self.build_pass(tracer)?;

        phase_begin(tracer, frame_index, PhaseKind::Input);
        let pointing = self.store.dispatch_input(InputKind::Pointing);
        self.record_input(InputKind::Pointing, pointing, tracer);
        let button = self.store.dispatch_input(InputKind::Button);
        self.record_input(InputKind::Button, button, tracer);
        phase_end(tracer, frame_index, PhaseKind::Input);

        self.build_pass(tracer)?;
        let cursor = self.store.resolve_cursor();

        phase_begin(tracer, frame_index, PhaseKind::Update);
        let root = self.store.root;
        let updated = self.store.update_subtree(root);
        if updated.is_ok() {
            self.store.resolve_layers();
        }
        phase_end(tracer, frame_index, PhaseKind::Update);
        updated?;

        phase_begin(tracer, frame_index, PhaseKind::Damage);
        self.collect_damage(tracer);
        phase_end(tracer, frame_index, PhaseKind::Damage);

        self.drawable = true;
        tracer.frame_summary(&FrameSummary {
            frame_index,
            node_count: self.store.node_count(),
            layer_count: self.store.layers.len(),
            damage: self.damage.rect(),
            pointing: pointing.map(|d| d.node),
            button: button.map(|d| d.node),
            cursor,
        });
        tracing::trace!(frame_index, damage = ?self.damage, "update finished");
        Ok(FrameOutcome {
            pointing,
            button,
            cursor,
        })
    }

    /// Draws the accumulated damage onto `screen`. See
    /// [`draw_traced`](Self::draw_traced).
    pub fn draw(&mut self, screen: &mut S) -> bool {
        self.draw_traced(screen, &mut Tracer::none())
    }

    /// Repaints the accumulated damage region of `screen` and clears it.
    ///
    /// Returns `false` without touching `screen` when there is no damage or
    /// the latest update failed.
    pub fn draw_traced(&mut self, screen: &mut S, tracer: &mut Tracer<'_>) -> bool {
        if !self.drawable {
            return false;
        }
        let Some(rect) = self.damage.rect() else {
            return false;
        };
        let frame_index = self.store.frame.index;
        let rect = rect.intersect(screen.bounds());
        self.damage.clear();
        if is_empty_rect(rect) {
            return false;
        }

        phase_begin(tracer, frame_index, PhaseKind::Draw);
        self.draws += 1;
        compose::draw_tree(&mut self.store, &mut self.buffers, screen, rect, self.draws);
        self.buffers.collect_idle(self.draws);
        tracer.draw(&DrawEvent {
            frame_index,
            rect,
            buffers: self.buffers.len(),
        });
        phase_end(tracer, frame_index, PhaseKind::Draw);
        tracing::trace!(frame_index, ?rect, buffers = self.buffers.len(), "drew damage");
        true
    }

    fn build_pass(&mut self, tracer: &mut Tracer<'_>) -> Result<(), FrameError> {
        let frame_index = self.store.frame.index;
        phase_begin(tracer, frame_index, PhaseKind::Build);
        let built = self.store.build();
        match &built {
            Ok(()) => {
                self.store.resolve_layers();
                for id in self.store.detached.drain(..) {
                    self.buffers.release(id);
                }
            }
            Err(err) => {
                tracing::debug!(frame_index, node = ?err.node(), "build pass failed");
            }
        }
        phase_end(tracer, frame_index, PhaseKind::Build);
        built
    }

    fn record_input(&self, kind: InputKind, dispatch: Option<Dispatch>, tracer: &mut Tracer<'_>) {
        let Some(dispatch) = dispatch else {
            return;
        };
        let frame_index = self.store.frame.index;
        if self.options.debug.log_input {
            tracing::info!(frame_index, ?kind, node = ?dispatch.node, aborted = dispatch.aborted, "input handled");
        } else {
            tracing::trace!(frame_index, ?kind, node = ?dispatch.node, aborted = dispatch.aborted, "input handled");
        }
        tracer.input(&InputEvent {
            frame_index,
            kind,
            node: dispatch.node,
            aborted: dispatch.aborted,
        });
    }

    fn collect_damage(&mut self, tracer: &mut Tracer<'_>) {
        let frame = (self.store.frame.viewport, self.store.frame.scale);
        let full = self.last_frame != Some(frame);
        self.last_frame = Some(frame);

        let mut contributions = core::mem::take(&mut self.contributions);
        self.store.collect_damage(full, &mut contributions);
        let frame_index = self.store.frame.index;
        for c in contributions.drain(..) {
            if self.options.debug.log_redraw_regions {
                tracing::info!(frame_index, cause = ?c.cause, node = ?c.node, rect = ?c.rect, "redraw requested");
            } else {
                tracing::trace!(frame_index, cause = ?c.cause, node = ?c.node, rect = ?c.rect, "redraw requested");
            }
            tracer.damage(&DamageEvent {
                frame_index,
                cause: c.cause,
                node: c.node,
                rect: c.rect,
            });
            self.damage.add(c.rect);
        }
        self.contributions = contributions;
    }
}

impl<S: Surface> NodeStore<S> {
    /// Runs update hooks top-down in child order.
    fn update_subtree(&mut self, idx: u32) -> Result<(), FrameError> {
        self.with_widget(idx, |widget, cx| widget.update(cx))
            .map_err(|source| FrameError::Update {
                node: self.id_of(idx),
                source,
            })?;
        for k in 0..self.children[idx as usize].len() {
            let child = self.children[idx as usize][k];
            self.update_subtree(child)?;
        }
        Ok(())
    }
}

fn phase_begin(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_begin(&PhaseBeginEvent { frame_index, phase });
}

fn phase_end(tracer: &mut Tracer<'_>, frame_index: u64, phase: PhaseKind) {
    tracer.phase_end(&PhaseEndEvent { frame_index, phase });
}
