// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runtime configuration.

/// Options fixed when a [`Runtime`](crate::Runtime) is constructed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RuntimeOptions {
    /// Application scale, multiplied with the host's device scale.
    pub app_scale: f64,
    /// Diagnostic logging switches.
    pub debug: DebugOptions,
    /// Draws after which an unused (or persistently oversized) offscreen
    /// buffer is released. Updates that are not drawn do not count.
    pub buffer_idle_frames: u32,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            app_scale: 1.0,
            debug: DebugOptions::default(),
            buffer_idle_frames: 60,
        }
    }
}

/// Diagnostic logging switches.
///
/// Both switches raise the corresponding `tracing` events from `trace` to
/// `info` level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DebugOptions {
    /// Log every handled pointing and button event.
    pub log_input: bool,
    /// Log every redraw request as it is folded into the damage region.
    pub log_redraw_regions: bool,
}

impl DebugOptions {
    /// Environment variable read by [`from_env`](Self::from_env).
    pub const ENV_VAR: &'static str = "LAMINA_DEBUG";

    /// Parses a comma-separated token list: `input`, `redraw`.
    ///
    /// Unknown tokens are ignored with a warning.
    #[must_use]
    pub fn parse(tokens: &str) -> Self {
        let mut options = Self::default();
        for token in tokens.split(',').map(str::trim) {
            match token {
                "" => {}
                "input" => options.log_input = true,
                "redraw" => options.log_redraw_regions = true,
                other => tracing::warn!(token = other, "unknown debug token"),
            }
        }
        options
    }

    /// Reads [`ENV_VAR`](Self::ENV_VAR); unset means everything off.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_var(std::env::var(Self::ENV_VAR))
    }

    /// Interprets the result of looking up [`ENV_VAR`](Self::ENV_VAR).
    ///
    /// A value that is not valid Unicode is treated as unset.
    pub(crate) fn from_var(value: Result<String, std::env::VarError>) -> Self {
        match value {
            Ok(tokens) => Self::parse(&tokens),
            Err(std::env::VarError::NotPresent) => Self::default(),
            Err(err) => {
                tracing::warn!(var = Self::ENV_VAR, %err, "ignoring debug variable");
                Self::default()
            }
        }
    }
}
