// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors surfaced by the frame driver.

use crate::node::NodeId;

/// Error type returned by widget hooks.
pub type WidgetError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A frame pipeline stage failed.
///
/// The rest of the frame is abandoned; the host decides whether to skip the
/// frame or shut down. Nothing is drawn until an update succeeds again.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A widget's build hook failed.
    #[error("build hook of {node:?} failed")]
    Build {
        /// The node whose hook failed.
        node: NodeId,
        /// The widget's error.
        #[source]
        source: WidgetError,
    },
    /// A widget's update hook failed.
    #[error("update hook of {node:?} failed")]
    Update {
        /// The node whose hook failed.
        node: NodeId,
        /// The widget's error.
        #[source]
        source: WidgetError,
    },
}

impl FrameError {
    /// Returns the node whose hook failed.
    #[must_use]
    pub fn node(&self) -> NodeId {
        match self {
            Self::Build { node, .. } | Self::Update { node, .. } => *node,
        }
    }
}
