pub mod answer;
pub mod contest;
pub mod execution;
pub mod grading;
pub mod language;
pub mod loaders;
pub mod session;

pub use answer::AnswerValue;
pub use contest::{ContestDefinition, Question, QuestionId, QuestionKind, TestCase};
pub use execution::{ExecutionRequest, ExecutionResponse, RunSummary, TestCaseResult};
pub use grading::{
    CompletionReport, GradingResponse, QuestionResult, SubmissionEntry, SubmissionPayload,
};
pub use language::Language;
pub use loaders::{load_contest_from_toml, parse_contest_toml};
pub use session::{Notice, NoticeLevel, SessionStatus, SubmitTrigger, ViolationCategory};
