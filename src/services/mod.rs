pub mod answer_buffer;
pub mod attempt_journal;
pub mod countdown;
pub mod execution_gateway;
pub mod notice_board;
pub mod violation_tracker;

pub use answer_buffer::AnswerBuffer;
pub use attempt_journal::AttemptJournal;
pub use countdown::{format_clock, CountdownTimer, TickOutcome};
pub use execution_gateway::{provisional_score, CheckMode, CodeExecutionGateway, ExecutionOutcome};
pub use notice_board::NoticeBoard;
pub use violation_tracker::{ViolationCounts, ViolationOutcome, ViolationTracker, VIOLATION_THRESHOLD};
