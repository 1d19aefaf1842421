//! Stage sequencing: progress snapshot, state machine, observers and scoring.

mod events;
mod info;
mod machine;
mod results;

pub use events::{Observers, StageEvent, SubscriptionId, SubscriptionScope};
pub use info::{StageInfo, StageKind, StageState};
pub use machine::StageMachine;
pub use results::LevelResults;
