//! 交卷协调器
//!
//! 定义"一次交卷"的完整流程：
//! 最后一次全量检测 → 构造载荷 → 提交评分 → 回写结果

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::GradingApi;
use crate::infrastructure::FullscreenControl;
use crate::models::CompletionReport;
use crate::services::CodeExecutionGateway;
use crate::workflow::SessionStateMachine;

/// 一次交卷调用的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// 评分成功，会话已完成
    Completed(CompletionReport),
    /// 评分失败，会话停留在 Submitting
    Failed(String),
    /// 没有进入交卷状态、已有进行中的交卷或会话已完成
    Skipped,
}

/// 交卷协调器
///
/// 职责：
/// - 通过会话的守卫保证同一时刻最多一个评分请求
/// - 当前题是编程题时先做一次全量检测（失败不影响交卷）
/// - 成功后整体覆盖分数并进入 Completed
pub struct SubmissionCoordinator {
    gateway: CodeExecutionGateway,
    grading: Arc<dyn GradingApi>,
    fullscreen: Arc<dyn FullscreenControl>,
}

impl SubmissionCoordinator {
    pub fn new(
        gateway: CodeExecutionGateway,
        grading: Arc<dyn GradingApi>,
        fullscreen: Arc<dyn FullscreenControl>,
    ) -> Self {
        Self {
            gateway,
            grading,
            fullscreen,
        }
    }

    /// 执行交卷
    pub async fn submit(&self, machine: &mut SessionStateMachine) -> SubmitOutcome {
        if !machine.try_acquire_submission() {
            debug!("{} 交卷请求被忽略 (状态 {})", machine.ctx(), machine.status());
            return SubmitOutcome::Skipped;
        }

        // 1. 最后一次全量检测
        if let Some(target) = machine.final_check_target() {
            match self
                .gateway
                .submit_check(&target.question, &target.code, target.language)
                .await
            {
                Ok(outcome) => machine.apply_execution_outcome(outcome),
                Err(e) => {
                    warn!("{} 交卷前全量检测失败，继续交卷", machine.ctx());
                    machine.execution_failed(target.question.id, &e);
                }
            }
        }

        // 2. 构造载荷
        let payload = machine.build_payload();
        let contest_id = machine.contest().id;

        // 3. 提交评分（不取消）
        let response = match self.grading.submit(contest_id, &payload).await {
            Ok(response) => response,
            Err(e) => {
                machine.fail_submission(&e);
                return SubmitOutcome::Failed(e.user_message());
            }
        };

        if let Some(message) = &response.message {
            info!("{} 评分接口: {}", machine.ctx(), message);
        }

        // 4. 回写结果
        match machine.complete_submission(&response, self.fullscreen.as_ref()) {
            Ok(report) => SubmitOutcome::Completed(report),
            Err(e) => {
                machine.fail_submission(&e);
                SubmitOutcome::Failed(e.user_message())
            }
        }
    }

    /// 考生手动重试上一次失败的交卷
    pub async fn retry(&self, machine: &mut SessionStateMachine) -> SubmitOutcome {
        if !machine.can_retry() {
            debug!("{} 当前不能重试交卷", machine.ctx());
            return SubmitOutcome::Skipped;
        }
        info!("{} 🔁 重试交卷", machine.ctx());
        self.submit(machine).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::CodeExecutionApi;
    use crate::error::{AppError, AppResult};
    use crate::infrastructure::HeadlessFullscreen;
    use crate::models::{
        AnswerValue, ContestDefinition, ExecutionRequest, GradingResponse, Language, Question,
        QuestionKind, QuestionResult, RunSummary, SessionStatus, SubmissionPayload, TestCase,
        TestCaseResult,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct PassingExecutor {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CodeExecutionApi for PassingExecutor {
        async fn execute(&self, request: &ExecutionRequest) -> AppResult<Vec<TestCaseResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(request
                .test_cases
                .iter()
                .map(|case| TestCaseResult {
                    input: Some(case.input.clone()),
                    expected_output: Some(case.expected_output.clone()),
                    actual_output: Some(case.expected_output.clone()),
                    passed: true,
                    error: None,
                })
                .collect())
        }
    }

    /// 前 `failures` 次返回错误，之后成功
    struct ScriptedGrading {
        failures: usize,
        payloads: Mutex<Vec<SubmissionPayload>>,
    }

    impl ScriptedGrading {
        fn new(failures: usize) -> Self {
            Self {
                failures,
                payloads: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.payloads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GradingApi for ScriptedGrading {
        async fn submit(
            &self,
            _contest_id: i64,
            payload: &SubmissionPayload,
        ) -> AppResult<GradingResponse> {
            let call = {
                let mut payloads = self.payloads.lock().unwrap();
                payloads.push(payload.clone());
                payloads.len()
            };
            if call <= self.failures {
                return Err(AppError::bad_response("submit", 400, "Contest is not active"));
            }
            Ok(GradingResponse {
                message: Some("Contest submitted successfully".to_string()),
                score: Some(5),
                max_score: Some(6),
                results: vec![
                    QuestionResult {
                        question_id: 1,
                        kind: QuestionKind::SingleChoice,
                        score: 0,
                        passed: false,
                        test_results: None,
                        error: None,
                    },
                    QuestionResult {
                        question_id: 2,
                        kind: QuestionKind::Coding,
                        score: 5,
                        passed: true,
                        test_results: Some(vec![TestCaseResult {
                            input: Some("1".to_string()),
                            expected_output: Some("1".to_string()),
                            actual_output: Some("1".to_string()),
                            passed: true,
                            error: None,
                        }]),
                        error: None,
                    },
                ],
            })
        }
    }

    fn contest() -> ContestDefinition {
        ContestDefinition {
            id: 9,
            name: "Submit".to_string(),
            duration_minutes: 5,
            time_remaining: None,
            questions: vec![
                Question {
                    id: 1,
                    kind: QuestionKind::SingleChoice,
                    description: "pick".to_string(),
                    score: 1,
                    options: vec!["A".to_string(), "B".to_string()],
                    visible_test_cases: Vec::new(),
                    invisible_test_cases: Vec::new(),
                    time_limit_seconds: None,
                    initial_code: None,
                },
                Question {
                    id: 2,
                    kind: QuestionKind::Coding,
                    description: "echo".to_string(),
                    score: 5,
                    options: Vec::new(),
                    visible_test_cases: vec![TestCase::new("1", "1")],
                    invisible_test_cases: vec![TestCase::new("2", "2")],
                    time_limit_seconds: Some(1),
                    initial_code: Some("print(input())".to_string()),
                },
            ],
        }
    }

    fn setup(
        failures: usize,
    ) -> (
        SubmissionCoordinator,
        Arc<PassingExecutor>,
        Arc<ScriptedGrading>,
        SessionStateMachine,
    ) {
        let executor = Arc::new(PassingExecutor {
            calls: AtomicUsize::new(0),
        });
        let grading = Arc::new(ScriptedGrading::new(failures));
        let fullscreen = Arc::new(HeadlessFullscreen::new());
        let coordinator = SubmissionCoordinator::new(
            CodeExecutionGateway::new(executor.clone()),
            grading.clone(),
            fullscreen.clone(),
        );
        let mut machine = SessionStateMachine::new(contest(), Language::Python, false).unwrap();
        machine.start(fullscreen.as_ref()).unwrap();
        (coordinator, executor, grading, machine)
    }

    #[tokio::test]
    async fn test_submit_is_skipped_while_active() {
        let (coordinator, _, grading, mut machine) = setup(0);
        assert_eq!(coordinator.submit(&mut machine).await, SubmitOutcome::Skipped);
        assert_eq!(grading.calls(), 0);
    }

    #[tokio::test]
    async fn test_double_submit_posts_once() {
        let (coordinator, _, grading, mut machine) = setup(0);
        machine.record_answer(1, AnswerValue::text("B")).unwrap();
        machine.request_submit(true);

        let first = coordinator.submit(&mut machine).await;
        let second = coordinator.submit(&mut machine).await;

        assert!(matches!(first, SubmitOutcome::Completed(_)));
        assert_eq!(second, SubmitOutcome::Skipped);
        assert_eq!(grading.calls(), 1);
        assert_eq!(machine.status(), SessionStatus::Completed);
        assert_eq!(machine.score(1), Some(0));
        assert_eq!(machine.score(2), Some(5));

        let payload = &grading.payloads.lock().unwrap()[0];
        assert_eq!(payload.submission[0].answer, AnswerValue::selected(["B"]));
        assert_eq!(payload.submission[1].answer, AnswerValue::text("print(input())"));
    }

    #[tokio::test]
    async fn test_open_coding_question_gets_final_check() {
        let (coordinator, executor, _, mut machine) = setup(0);
        machine.go_to(1).unwrap();
        machine.request_submit(true);

        let outcome = coordinator.submit(&mut machine).await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        match outcome {
            SubmitOutcome::Completed(report) => {
                assert_eq!(report.coding, Some(RunSummary { passed: 1, total: 1, errors: 0 }));
                assert_eq!(report.message(), "Test submitted!\nTotal Test Cases: 1/1 passed");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_choice_question_skips_final_check() {
        let (coordinator, executor, _, mut machine) = setup(0);
        machine.request_submit(true);
        coordinator.submit(&mut machine).await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let (coordinator, _, grading, mut machine) = setup(1);
        machine.request_submit(true);

        let first = coordinator.submit(&mut machine).await;
        assert_eq!(first, SubmitOutcome::Failed("Contest is not active".to_string()));
        assert_eq!(machine.status(), SessionStatus::Submitting);
        assert!(!machine.is_submission_in_flight());

        let retried = coordinator.retry(&mut machine).await;
        assert!(matches!(retried, SubmitOutcome::Completed(_)));
        assert_eq!(grading.calls(), 2);

        assert_eq!(coordinator.retry(&mut machine).await, SubmitOutcome::Skipped);
        assert_eq!(grading.calls(), 2);
    }
}
