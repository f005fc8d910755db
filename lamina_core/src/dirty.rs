// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! Explicit redraw requests go through [`understory_dirty`]. Every appended
//! child has a dependency edge on its parent in the [`REDRAW`] channel, so a
//! request marked with [`EagerPolicy`](understory_dirty::EagerPolicy) also
//! surfaces the requester's descendants when the channel is drained. Damage
//! collection keeps the requester itself plus any descendant whose effective
//! z differs from its parent's: such a node (a popup, say) paints outside the
//! requester's rectangle and would otherwise be missed.
//!
//! Edges are rewritten along with the child lists on every build pass.

use understory_dirty::Channel;

/// A node asked to be redrawn.
pub(crate) const REDRAW: Channel = Channel::new(0);
