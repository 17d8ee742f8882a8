pub mod session_ctx;
pub mod session_machine;
pub mod submission;

pub use session_ctx::SessionCtx;
pub use session_machine::{ExecutionTarget, SessionStateMachine};
pub use submission::{SubmissionCoordinator, SubmitOutcome};
