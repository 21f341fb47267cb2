//! Lifecycle states.

use std::fmt;

/// Where the engine is in the current invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Idle,
    PreBuilding,
    Building,
    PostProcessing,
    Running,
    Done,
    Aborted,
    Cleaning,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::PreBuilding => "pre-building",
            LifecycleState::Building => "building",
            LifecycleState::PostProcessing => "post-processing",
            LifecycleState::Running => "running",
            LifecycleState::Done => "done",
            LifecycleState::Aborted => "aborted",
            LifecycleState::Cleaning => "cleaning",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
