//! 作答会话状态机
//!
//! 持有整个作答会话的状态，所有修改都经过这里的方法：
//! 计时节拍、违规事件、考生操作、代码执行结果、交卷结果。
//! 本身不做任何 I/O，异步调用由编排层和交卷协调器完成后再把结果交回来

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, SessionError};
use crate::infrastructure::{FullscreenControl, IntegrityEvent};
use crate::models::{
    AnswerValue, CompletionReport, ContestDefinition, GradingResponse, Language, Notice, Question,
    QuestionId, SessionStatus, SubmissionEntry, SubmissionPayload, SubmitTrigger,
    ViolationCategory,
};
use crate::services::{
    format_clock, AnswerBuffer, CheckMode, CountdownTimer, ExecutionOutcome, NoticeBoard,
    TickOutcome, ViolationCounts, ViolationTracker,
};
use crate::workflow::SessionCtx;

pub const FULLSCREEN_REQUIRED_MESSAGE: &str = "Please enable fullscreen to start the test.";
pub const CONFIRM_SUBMIT_MESSAGE: &str =
    "Are you sure you want to submit the test? Type `confirm` to submit or keep working.";
pub const TIME_UP_MESSAGE: &str = "Time is up! Submitting test.";

/// 一次代码执行所需的全部输入（题目快照 + 代码 + 语言）
#[derive(Debug, Clone)]
pub struct ExecutionTarget {
    pub mode: CheckMode,
    pub question: Question,
    pub code: String,
    pub language: Language,
}

/// 作答会话状态机
///
/// 职责：
/// - 维护状态单调前进 NotStarted → Active → Submitting → Completed
/// - 计时与违规计数只在 Active 时生效
/// - 交卷触发只生效一次，进行中的交卷由守卫保护
/// - 交卷完成后用评分结果整体覆盖分数
pub struct SessionStateMachine {
    ctx: SessionCtx,
    contest: Arc<ContestDefinition>,
    language: Language,
    resume_from_server_clock: bool,

    status: SessionStatus,
    current_index: usize,
    answers: AnswerBuffer,
    /// 当前打开的编辑框里尚未写入答案的内容
    draft: Option<String>,
    scores: HashMap<QuestionId, u32>,
    violations: ViolationTracker,
    timer: CountdownTimer,
    last_run_results: Option<ExecutionOutcome>,

    confirmation_pending: bool,
    trigger: Option<SubmitTrigger>,
    submission_in_flight: bool,
    last_submission_error: Option<String>,
    report: Option<CompletionReport>,

    notices: NoticeBoard,
}

impl SessionStateMachine {
    /// 由加载好的竞赛创建会话，状态为 NotStarted
    pub fn new(
        contest: ContestDefinition,
        language: Language,
        resume_from_server_clock: bool,
    ) -> AppResult<Self> {
        contest.validate()?;

        let ctx = SessionCtx::new(&contest, language);
        let answers = AnswerBuffer::from_contest(&contest);
        let scores = contest.questions.iter().map(|q| (q.id, 0)).collect();

        debug!("{} 会话已创建", ctx);

        Ok(Self {
            ctx,
            contest: Arc::new(contest),
            language,
            resume_from_server_clock,
            status: SessionStatus::NotStarted,
            current_index: 0,
            answers,
            draft: None,
            scores,
            violations: ViolationTracker::new(),
            timer: CountdownTimer::new(),
            last_run_results: None,
            confirmation_pending: false,
            trigger: None,
            submission_in_flight: false,
            last_submission_error: None,
            report: None,
            notices: NoticeBoard::new(),
        })
    }

    // ========== 生命周期 ==========

    /// 开始作答
    ///
    /// 全屏请求失败只提示，不阻止开始
    pub fn start(&mut self, fullscreen: &dyn FullscreenControl) -> AppResult<()> {
        self.require(SessionStatus::NotStarted)?;

        let budget = self.initial_budget();
        self.status = SessionStatus::Active;
        self.timer.start(budget);

        if let Err(e) = fullscreen.request_fullscreen() {
            warn!("{} 全屏请求失败: {}", self.ctx, e);
            self.notices.warning(FULLSCREEN_REQUIRED_MESSAGE);
        }

        info!("{} ▶️ 开始作答，剩余时间 {}", self.ctx, format_clock(budget));
        Ok(())
    }

    fn initial_budget(&self) -> u64 {
        let full = self.contest.duration_seconds();
        match (self.resume_from_server_clock, self.contest.time_remaining) {
            (true, Some(remaining)) => remaining.min(full),
            _ => full,
        }
    }

    /// 处理一次计时节拍；时间用尽时返回交卷触发
    pub fn tick(&mut self) -> Option<SubmitTrigger> {
        if self.status != SessionStatus::Active {
            return None;
        }

        match self.timer.tick() {
            TickOutcome::Expired => {
                self.notices.warning(TIME_UP_MESSAGE);
                self.begin_submitting(SubmitTrigger::Timeout)
            }
            TickOutcome::Running { .. } | TickOutcome::Idle => None,
        }
    }

    /// 处理外部完整性事件
    pub fn handle_integrity_event(&mut self, event: IntegrityEvent) -> Option<SubmitTrigger> {
        match event.category() {
            Some(category) => self.record_violation(category),
            None => {
                debug!("{} 忽略事件 {:?}", self.ctx, event);
                None
            }
        }
    }

    /// 记录一次违规；达到阈值时返回交卷触发（每个类别只有一次）
    pub fn record_violation(&mut self, category: ViolationCategory) -> Option<SubmitTrigger> {
        if self.status != SessionStatus::Active {
            debug!("{} 状态 {} 下忽略违规 {}", self.ctx, self.status, category);
            return None;
        }

        let outcome = self.violations.record_violation(category)?;
        self.notices.warning(outcome.warning_message());

        if outcome.threshold_reached {
            self.begin_submitting(SubmitTrigger::ViolationThreshold(category))
        } else {
            None
        }
    }

    /// 考生请求交卷；未确认时只提示确认
    pub fn request_submit(&mut self, confirmed: bool) -> Option<SubmitTrigger> {
        if self.status != SessionStatus::Active {
            return None;
        }
        if !confirmed {
            self.confirmation_pending = true;
            self.notices.info(CONFIRM_SUBMIT_MESSAGE);
            return None;
        }
        self.begin_submitting(SubmitTrigger::UserConfirmed)
    }

    /// 确认之前的交卷请求
    pub fn confirm_submit(&mut self) -> Option<SubmitTrigger> {
        if !self.confirmation_pending {
            debug!("{} 没有待确认的交卷请求", self.ctx);
            return None;
        }
        self.request_submit(true)
    }

    pub fn cancel_confirmation(&mut self) {
        self.confirmation_pending = false;
    }

    /// 命令输入已关闭：作答中只能等计时结束自动交卷
    pub fn input_closed(&mut self) {
        if self.status != SessionStatus::Active {
            return;
        }
        self.notices.warning(format!(
            "Input closed. No further commands can be received; the test will be submitted automatically in {}.",
            format_clock(self.timer.remaining())
        ));
    }

    /// Active → Submitting，只会成功一次
    fn begin_submitting(&mut self, trigger: SubmitTrigger) -> Option<SubmitTrigger> {
        if self.status != SessionStatus::Active {
            return None;
        }

        if let Err(e) = self.flush_current_answer() {
            warn!("{} 交卷前写入编辑内容失败: {}", self.ctx, e);
        }

        self.status = SessionStatus::Submitting;
        self.timer.stop();
        self.violations.freeze();
        self.confirmation_pending = false;
        self.trigger = Some(trigger);

        info!("{} 📝 进入交卷: {}", self.ctx, trigger);
        Some(trigger)
    }

    // ========== 答案与导航 ==========

    /// 覆盖写入某题答案；非编程题的分数归零
    pub fn record_answer(&mut self, question_id: QuestionId, value: AnswerValue) -> AppResult<()> {
        self.require(SessionStatus::Active)?;

        self.answers.set(question_id, value)?;
        if self.current_question().id == question_id {
            self.draft = None;
        }
        self.reset_score_if_not_coding(question_id);
        Ok(())
    }

    /// 更新当前题目编辑框内容（尚未写入答案）
    pub fn edit_current(&mut self, text: impl Into<String>) -> AppResult<()> {
        self.require(SessionStatus::Active)?;

        let question = self.current_question();
        if !question.kind.has_editor() {
            return Err(SessionError::AnswerKindMismatch {
                question_id: question.id,
                kind: question.kind,
            }
            .into());
        }
        self.draft = Some(text.into());
        Ok(())
    }

    /// 把当前编辑框内容写入答案，返回答案是否变化
    pub fn flush_current_answer(&mut self) -> AppResult<bool> {
        let Some(draft) = self.draft.take() else {
            return Ok(false);
        };

        let question_id = self.current_question().id;
        let changed = self.answers.set(question_id, AnswerValue::Text(draft))?;
        if changed {
            self.reset_score_if_not_coding(question_id);
        }
        Ok(changed)
    }

    fn reset_score_if_not_coding(&mut self, question_id: QuestionId) {
        let is_coding = self
            .contest
            .question(question_id)
            .is_some_and(Question::is_coding);
        if !is_coding {
            self.scores.insert(question_id, 0);
        }
    }

    /// 跳转到指定题目（从0开始）
    pub fn go_to(&mut self, index: usize) -> AppResult<()> {
        self.require(SessionStatus::Active)?;

        let count = self.contest.questions.len();
        if index >= count {
            return Err(SessionError::QuestionIndexOutOfRange { index, count }.into());
        }

        self.flush_current_answer()?;
        if index != self.current_index {
            self.current_index = index;
            self.last_run_results = None;
            debug!("{} 切换到第 {} 题", self.ctx, index + 1);
        }
        Ok(())
    }

    /// 下一题；已是最后一题时返回 false
    pub fn next(&mut self) -> AppResult<bool> {
        if self.current_index + 1 >= self.contest.questions.len() {
            self.require(SessionStatus::Active)?;
            return Ok(false);
        }
        self.go_to(self.current_index + 1)?;
        Ok(true)
    }

    /// 上一题；已是第一题时返回 false
    pub fn previous(&mut self) -> AppResult<bool> {
        if self.current_index == 0 {
            self.require(SessionStatus::Active)?;
            return Ok(false);
        }
        self.go_to(self.current_index - 1)?;
        Ok(true)
    }

    /// 作答中切换编程语言
    pub fn set_language(&mut self, language: Language) -> AppResult<()> {
        if self.status > SessionStatus::Active {
            return Err(AppError::invalid_status(self.status));
        }
        self.language = language;
        self.ctx.language = language;
        Ok(())
    }

    // ========== 代码执行 ==========

    /// 当前编程题的代码（编辑框内容优先）
    pub fn current_code(&self) -> Option<String> {
        let question = self.current_question();
        if !question.is_coding() {
            return None;
        }
        self.draft
            .clone()
            .or_else(|| self.answers.get(question.id).and_then(|v| v.as_text().map(str::to_string)))
    }

    /// 准备对当前题目执行代码；会先写入编辑框内容
    pub fn prepare_execution(&mut self, mode: CheckMode) -> AppResult<ExecutionTarget> {
        self.require(SessionStatus::Active)?;

        let question = self.current_question();
        if !question.is_coding() {
            return Err(SessionError::NotCodingQuestion {
                question_id: question.id,
            }
            .into());
        }

        self.flush_current_answer()?;
        Ok(self.execution_target(mode))
    }

    /// 交卷前最后一次全量检测的目标；当前题不是编程题时为 `None`
    pub fn final_check_target(&self) -> Option<ExecutionTarget> {
        if self.status != SessionStatus::Submitting || !self.current_question().is_coding() {
            return None;
        }
        Some(self.execution_target(CheckMode::SubmitCheck))
    }

    fn execution_target(&self, mode: CheckMode) -> ExecutionTarget {
        let question = self.current_question().clone();
        let code = self
            .answers
            .get(question.id)
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default();
        ExecutionTarget {
            mode,
            question,
            code,
            language: self.language,
        }
    }

    /// 应用代码执行结果
    ///
    /// 只有结果仍属于当前题目时才展示；全量检测的临时分数在交卷完成前有效
    pub fn apply_execution_outcome(&mut self, outcome: ExecutionOutcome) {
        if self.status == SessionStatus::Completed {
            debug!("{} 已交卷，丢弃题目 {} 的执行结果", self.ctx, outcome.question_id);
            return;
        }

        if let Some(score) = outcome.provisional_score {
            self.scores.insert(outcome.question_id, score);
        }

        if outcome.question_id != self.current_question().id {
            debug!(
                "{} 题目 {} 的执行结果返回时已切换题目",
                self.ctx, outcome.question_id
            );
            return;
        }

        self.notices.info(outcome.message());
        self.last_run_results = Some(outcome);
    }

    /// 代码执行失败：只提示，不改变状态
    pub fn execution_failed(&mut self, question_id: QuestionId, error: &AppError) {
        warn!("{} 题目 {} 代码执行失败: {}", self.ctx, question_id, error);
        self.notices.error(error.user_message());
    }

    /// 考生操作被拒绝时提示原因
    pub fn reject(&mut self, error: &AppError) {
        debug!("{} 操作被拒绝: {}", self.ctx, error);
        self.notices.error(error.user_message());
    }

    // ========== 交卷 ==========

    /// 获取交卷守卫；读取与设置在同一次调用中完成
    pub fn try_acquire_submission(&mut self) -> bool {
        if self.status != SessionStatus::Submitting || self.submission_in_flight {
            return false;
        }
        self.submission_in_flight = true;
        true
    }

    /// 按题目顺序构造交卷载荷
    pub fn build_payload(&self) -> SubmissionPayload {
        let submission = self
            .contest
            .questions
            .iter()
            .map(|q| SubmissionEntry {
                question_id: q.id,
                answer: self
                    .answers
                    .get(q.id)
                    .cloned()
                    .unwrap_or_else(|| q.kind.empty_answer()),
            })
            .collect();

        let counts = self.violations.counts();
        SubmissionPayload {
            submission,
            language: self.language,
            tab_switch_count: counts.tab_switch,
            fullscreen_exit_count: counts.fullscreen_exit,
        }
    }

    /// 评分成功：分数整体以评分结果为准，进入 Completed
    pub fn complete_submission(
        &mut self,
        response: &GradingResponse,
        fullscreen: &dyn FullscreenControl,
    ) -> AppResult<CompletionReport> {
        if self.status != SessionStatus::Submitting || !self.submission_in_flight {
            return Err(AppError::invalid_status(self.status));
        }

        for score in self.scores.values_mut() {
            *score = 0;
        }
        for result in &response.results {
            if self.scores.contains_key(&result.question_id) {
                self.scores.insert(result.question_id, result.score);
            } else {
                warn!("{} 评分结果包含未知题目 {}", self.ctx, result.question_id);
            }
        }

        let report = CompletionReport {
            total_score: response
                .score
                .unwrap_or_else(|| self.scores.values().sum()),
            max_score: response
                .max_score
                .unwrap_or_else(|| self.contest.max_score()),
            coding: self
                .contest
                .has_coding_questions()
                .then(|| response.coding_summary().unwrap_or_default()),
        };

        self.status = SessionStatus::Completed;
        self.submission_in_flight = false;
        self.last_submission_error = None;
        self.notices.info(report.message());

        if let Err(e) = fullscreen.exit_fullscreen() {
            debug!("{} 退出全屏失败（忽略）: {}", self.ctx, e);
        }

        info!(
            "{} ✅ 交卷完成，得分 {}/{}",
            self.ctx, report.total_score, report.max_score
        );
        self.report = Some(report.clone());
        Ok(report)
    }

    /// 评分失败：释放守卫，状态保持 Submitting
    pub fn fail_submission(&mut self, error: &AppError) {
        self.submission_in_flight = false;
        let message = error.user_message();
        warn!("{} 交卷失败: {}", self.ctx, error);
        self.notices.error(message.clone());
        self.last_submission_error = Some(message);
    }

    /// 只有上一次交卷失败且没有进行中的请求时才能重试
    pub fn can_retry(&self) -> bool {
        self.status == SessionStatus::Submitting
            && !self.submission_in_flight
            && self.last_submission_error.is_some()
    }

    // ========== 访问器 ==========

    pub fn ctx(&self) -> &SessionCtx {
        &self.ctx
    }

    pub fn contest(&self) -> &ContestDefinition {
        &self.contest
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.contest.questions[self.current_index]
    }

    pub fn answer(&self, question_id: QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    pub fn answers(&self) -> &AnswerBuffer {
        &self.answers
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn score(&self, question_id: QuestionId) -> Option<u32> {
        self.scores.get(&question_id).copied()
    }

    pub fn scores(&self) -> &HashMap<QuestionId, u32> {
        &self.scores
    }

    pub fn violation_counts(&self) -> ViolationCounts {
        self.violations.counts()
    }

    pub fn time_remaining(&self) -> u64 {
        self.timer.remaining()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn last_run_results(&self) -> Option<&ExecutionOutcome> {
        self.last_run_results.as_ref()
    }

    pub fn confirmation_pending(&self) -> bool {
        self.confirmation_pending
    }

    pub fn submit_trigger(&self) -> Option<SubmitTrigger> {
        self.trigger
    }

    pub fn is_submission_in_flight(&self) -> bool {
        self.submission_in_flight
    }

    pub fn last_submission_error(&self) -> Option<&str> {
        self.last_submission_error.as_deref()
    }

    pub fn report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    /// 取出所有未读提示
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    fn require(&self, expected: SessionStatus) -> AppResult<()> {
        if self.status != expected {
            return Err(AppError::invalid_status(self.status));
        }
        Ok(())
    }
}
