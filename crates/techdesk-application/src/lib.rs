//! Use cases for the maintenance assistant: streamed chat turns, the
//! maintenance extraction, and the session that ties them together.

pub mod chat;
pub mod dashboard;
pub mod extraction;
pub mod manual_session;

#[cfg(test)]
mod test_support;

pub use chat::{ChatController, PendingTurn, TurnOutcome, TurnState};
pub use dashboard::{DashboardState, DashboardSummary};
pub use extraction::ExtractionPipeline;
pub use manual_session::ManualSession;
