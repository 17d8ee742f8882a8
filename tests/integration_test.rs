use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use contest_attempt::clients::{CodeExecutionApi, ContestApi, GradingApi, TomlContestSource};
use contest_attempt::error::AppResult;
use contest_attempt::models::{
    AnswerValue, ExecutionRequest, GradingResponse, QuestionKind, QuestionResult,
    SubmissionPayload, SubmitTrigger, TestCase, TestCaseResult, ViolationCategory,
};
use contest_attempt::services::AttemptJournal;
use contest_attempt::{
    AppError, AttemptCommand, AttemptRunner, ChannelIntegritySource, Collaborators, Config,
    ContestDefinition, HeadlessFullscreen, IntegrityEvent, Question, SessionStateMachine,
    SessionStatus,
};

// ========== 测试替身 ==========

/// 所有用例都通过的执行服务
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

/// 记录每次交卷载荷；前 `failures` 次返回错误
struct RecordingGrading {
    failures: usize,
    payloads: Mutex<Vec<SubmissionPayload>>,
}

impl RecordingGrading {
    fn calls(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

#[async_trait]
impl GradingApi for RecordingGrading {
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
            return Err(AppError::bad_response(
                "api/contests/contests/1/submit",
                503,
                "Grading service unavailable",
            ));
        }

        let results = payload
            .submission
            .iter()
            .map(|entry| QuestionResult {
                question_id: entry.question_id,
                kind: QuestionKind::Coding,
                score: 0,
                passed: false,
                test_results: Some(Vec::new()),
                error: None,
            })
            .collect();
        Ok(GradingResponse {
            message: Some("Contest submitted successfully".to_string()),
            score: Some(0),
            max_score: Some(10),
            results,
        })
    }
}

/// 不应被调用的竞赛来源（竞赛由测试直接提供）
struct UnusedContestSource;

#[async_trait]
impl ContestApi for UnusedContestSource {
    async fn fetch_contest(&self, contest_id: i64) -> AppResult<ContestDefinition> {
        Err(AppError::bad_response(
            format!("api/contests/student/attempt/{}/", contest_id),
            404,
            "Contest not found",
        ))
    }
}

struct Harness {
    executor: Arc<PassingExecutor>,
    grading: Arc<RecordingGrading>,
    fullscreen: Arc<HeadlessFullscreen>,
    runner: AttemptRunner,
}

/// 一道编程题：1 个可见用例 + 1 个隐藏用例，时长 1 分钟
fn coding_contest() -> ContestDefinition {
    ContestDefinition {
        id: 1,
        name: "Timeout Round".to_string(),
        duration_minutes: 1,
        time_remaining: None,
        questions: vec![Question {
            id: 100,
            kind: QuestionKind::Coding,
            description: "Echo the input".to_string(),
            score: 10,
            options: Vec::new(),
            visible_test_cases: vec![TestCase::new("1", "1")],
            invisible_test_cases: vec![TestCase::new("2", "2")],
            time_limit_seconds: Some(1),
            initial_code: None,
        }],
    }
}

fn harness(tick_interval_ms: u64, grading_failures: usize) -> Harness {
    let executor = Arc::new(PassingExecutor {
        calls: AtomicUsize::new(0),
    });
    let grading = Arc::new(RecordingGrading {
        failures: grading_failures,
        payloads: Mutex::new(Vec::new()),
    });
    let fullscreen = Arc::new(HeadlessFullscreen::new());

    let collaborators = Collaborators {
        contest_source: Arc::new(UnusedContestSource),
        execution: executor.clone(),
        grading: grading.clone(),
        fullscreen: fullscreen.clone(),
    };
    let config = Config {
        tick_interval_ms,
        ..Config::default()
    };
    let runner = AttemptRunner::from_contest(coding_contest(), &config, collaborators).unwrap();

    Harness {
        executor,
        grading,
        fullscreen,
        runner,
    }
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}.tmp", name, std::process::id()))
}

/// 运行事件循环直到结束，最多等待 10 秒
async fn run_to_end(
    runner: AttemptRunner,
    commands: mpsc::Receiver<AttemptCommand>,
    integrity: ChannelIntegritySource,
) -> SessionStateMachine {
    tokio::time::timeout(Duration::from_secs(10), runner.run(commands, integrity))
        .await
        .expect("事件循环没有在限定时间内结束")
        .expect("事件循环返回错误")
}

// ========== 场景测试 ==========

#[tokio::test]
async fn test_timeout_submits_buffered_answer() {
    let mut h = harness(1, 0);
    h.runner.start().unwrap();
    assert!(h.fullscreen.is_active());

    let (_command_tx, command_rx) = mpsc::channel(8);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();

    let machine = run_to_end(h.runner, command_rx, integrity).await;

    assert_eq!(machine.status(), SessionStatus::Completed);
    assert_eq!(machine.submit_trigger(), Some(SubmitTrigger::Timeout));
    assert_eq!(machine.time_remaining(), 0);
    assert_eq!(h.grading.calls(), 1);
    // 当前题是编程题，交卷前做了一次全量检测
    assert_eq!(h.executor.calls.load(Ordering::SeqCst), 1);

    let payloads = h.grading.payloads.lock().unwrap();
    assert_eq!(payloads[0].submission.len(), 1);
    assert_eq!(payloads[0].submission[0].question_id, 100);
    assert_eq!(payloads[0].submission[0].answer, AnswerValue::text(""));
    assert!(!h.fullscreen.is_active());
}

#[tokio::test]
async fn test_third_tab_switch_ends_the_attempt() {
    let mut h = harness(1000, 0);
    h.runner.start().unwrap();

    let (_command_tx, command_rx) = mpsc::channel(8);
    let (integrity_tx, integrity) = ChannelIntegritySource::channel();
    for _ in 0..3 {
        integrity_tx.send(IntegrityEvent::VisibilityHidden).unwrap();
        integrity_tx.send(IntegrityEvent::VisibilityVisible).unwrap();
    }

    let machine = run_to_end(h.runner, command_rx, integrity).await;

    assert_eq!(
        machine.submit_trigger(),
        Some(SubmitTrigger::ViolationThreshold(ViolationCategory::TabSwitch))
    );
    assert_eq!(machine.violation_counts().tab_switch, 3);
    assert_eq!(h.grading.calls(), 1);
    assert_eq!(h.grading.payloads.lock().unwrap()[0].tab_switch_count, 3);
}

#[tokio::test]
async fn test_repeated_submit_posts_once() {
    let h = harness(1000, 0);

    let (command_tx, command_rx) = mpsc::channel(16);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();
    let commands = [
        AttemptCommand::Start,
        AttemptCommand::Edit("print(input())".to_string()),
        AttemptCommand::Submit,
        AttemptCommand::Confirm,
        AttemptCommand::Submit,
        AttemptCommand::Confirm,
        AttemptCommand::Integrity(IntegrityEvent::VisibilityHidden),
    ];
    for command in commands {
        command_tx.send(command).await.unwrap();
    }

    let machine = run_to_end(h.runner, command_rx, integrity).await;

    assert_eq!(machine.status(), SessionStatus::Completed);
    assert_eq!(machine.submit_trigger(), Some(SubmitTrigger::UserConfirmed));
    assert_eq!(h.grading.calls(), 1);
    assert_eq!(
        h.grading.payloads.lock().unwrap()[0].submission[0].answer,
        AnswerValue::text("print(input())")
    );
}

#[tokio::test]
async fn test_failed_submission_can_be_retried() {
    let h = harness(1000, 1);

    let (command_tx, command_rx) = mpsc::channel(16);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();
    for command in [
        AttemptCommand::Start,
        AttemptCommand::Submit,
        AttemptCommand::Confirm,
        AttemptCommand::Retry,
    ] {
        command_tx.send(command).await.unwrap();
    }

    let machine = run_to_end(h.runner, command_rx, integrity).await;

    assert_eq!(machine.status(), SessionStatus::Completed);
    assert_eq!(h.grading.calls(), 2);
    assert_eq!(machine.report().map(|r| r.max_score), Some(10));
}

#[tokio::test]
async fn test_failed_submission_without_retry_stays_submitting() {
    let h = harness(1000, 1);

    let (command_tx, command_rx) = mpsc::channel(16);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();
    for command in [
        AttemptCommand::Start,
        AttemptCommand::Submit,
        AttemptCommand::Confirm,
    ] {
        command_tx.send(command).await.unwrap();
    }
    drop(command_tx);

    let machine = run_to_end(h.runner, command_rx, integrity).await;

    assert_eq!(machine.status(), SessionStatus::Submitting);
    assert_eq!(
        machine.last_submission_error(),
        Some("Grading service unavailable")
    );
    assert!(machine.can_retry());
    assert_eq!(h.grading.calls(), 1);
}

#[tokio::test]
async fn test_run_results_reach_the_journal() {
    let journal_path = temp_path("runner_journal");
    let h = harness(1000, 0);
    let runner = h
        .runner
        .with_journal(Some(AttemptJournal::new(&journal_path)));

    let (command_tx, command_rx) = mpsc::channel(16);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();
    let handle = tokio::spawn(run_to_end(runner, command_rx, integrity));

    command_tx.send(AttemptCommand::Start).await.unwrap();
    command_tx
        .send(AttemptCommand::Edit("print(input())".to_string()))
        .await
        .unwrap();
    command_tx.send(AttemptCommand::Run).await.unwrap();

    // 等待后台执行完成并回到事件循环
    while h.executor.calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    command_tx.send(AttemptCommand::Submit).await.unwrap();
    command_tx.send(AttemptCommand::Confirm).await.unwrap();

    let machine = handle.await.unwrap();
    assert_eq!(machine.status(), SessionStatus::Completed);

    let journal = tokio::fs::read_to_string(&journal_path).await.unwrap();
    assert!(journal.contains("Visible Test Cases: 1/1 passed"));
    assert!(journal.contains("Test submitted!"));

    let _ = tokio::fs::remove_file(&journal_path).await;
}

#[tokio::test]
async fn test_closed_command_channel_before_start_ends_loop() {
    let h = harness(1000, 0);
    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_tx);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();

    let machine = run_to_end(h.runner, command_rx, integrity).await;
    assert_eq!(machine.status(), SessionStatus::NotStarted);
    assert_eq!(h.grading.calls(), 0);
}

#[tokio::test]
async fn test_closed_command_channel_while_active_waits_for_timer() {
    let journal_path = temp_path("closed_input_journal");
    let h = harness(1, 0);
    let mut runner = h
        .runner
        .with_journal(Some(AttemptJournal::new(&journal_path)));
    runner.start().unwrap();

    let (command_tx, command_rx) = mpsc::channel(1);
    drop(command_tx);
    let (_integrity_tx, integrity) = ChannelIntegritySource::channel();

    let machine = run_to_end(runner, command_rx, integrity).await;

    assert_eq!(machine.status(), SessionStatus::Completed);
    assert_eq!(machine.submit_trigger(), Some(SubmitTrigger::Timeout));
    assert_eq!(h.grading.calls(), 1);

    let journal = tokio::fs::read_to_string(&journal_path).await.unwrap();
    assert!(journal.contains("Input closed. No further commands can be received"));
    assert!(journal.contains("Time is up! Submitting test."));

    let _ = tokio::fs::remove_file(&journal_path).await;
}

// ========== 离线竞赛文件 ==========

#[test]
fn test_load_contest_from_toml_file() {
    let path = temp_path("offline_contest.toml");
    std::fs::write(
        &path,
        r#"
id = 2
name = "Offline"
duration_minutes = 30

[[questions]]
id = 1
type = "msq"
description = "Pick primes"
score = 2
options = ["2", "3", "4"]

[[questions]]
id = 2
type = "blank"
description = "Capital of France"
score = 1
"#,
    )
    .unwrap();

    let contest = tokio_test::block_on(TomlContestSource::new(&path).fetch_contest(0)).unwrap();
    assert_eq!(contest.name, "Offline");
    assert_eq!(contest.max_score(), 3);

    let machine =
        SessionStateMachine::new(contest, contest_attempt::Language::Python, false).unwrap();
    assert_eq!(machine.answer(1), Some(&AnswerValue::Selected(Vec::new())));
    assert_eq!(machine.answer(2), Some(&AnswerValue::text("")));

    let _ = std::fs::remove_file(&path);
}
