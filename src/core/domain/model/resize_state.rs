use serde::Serialize;
use std::fmt;

/// Progress of the two-step node pool capacity protocol.
///
/// The protocol moves `Unconfigured → AutoscalingSet → Resized`. The two
/// steps are separate control-plane calls with no transaction between
/// them, so a failure can leave a pool in `AutoscalingSet`. Every step is
/// an idempotent overwrite, so re-submitting the same request converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeState {
    /// Nothing has been applied yet.
    Unconfigured,
    /// The autoscaler has been enabled or disabled.
    AutoscalingSet,
    /// The node count has been pinned.
    Resized,
}

impl fmt::Display for ResizeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResizeState::Unconfigured => "unconfigured",
            ResizeState::AutoscalingSet => "autoscaling_set",
            ResizeState::Resized => "resized",
        };
        f.write_str(name)
    }
}
