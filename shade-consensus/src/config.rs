//! Configuration for semantic verification and batch clearing.

use serde::{Deserialize, Serialize};

/// Configuration for the block processor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    /// The rule used to clear each batch.
    ///
    /// Every validator must use the same rule, or they will publish
    /// different batch output data for the same block.
    pub clearing: ClearingConfig,

    /// If set, claims may only anchor to one of this many most recent
    /// finalized blocks. Claims on older anchors are rejected as unknown.
    ///
    /// By default, any finalized anchor is accepted.
    pub recent_anchors: Option<u32>,
}

/// Selects the clearing rule, and holds its parameters.
///
/// In a config file, the rule is chosen by its `rule` key:
///
/// ```toml
/// [clearing]
/// rule = "depth_weighted"
/// virtual_depth = 1000
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case", deny_unknown_fields)]
pub enum ClearingConfig {
    /// Fill both sides completely whenever both sides have input.
    #[default]
    ProportionalSplit,

    /// Damp each side's fill by a virtual depth, refunding the rest.
    DepthWeighted {
        /// The virtual depth added to each side's aggregate input.
        virtual_depth: u64,
    },
}
