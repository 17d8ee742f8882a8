//! 作答运行器 - 编排层
//!
//! ## 职责
//!
//! 本模块是一次作答的入口，唯一持有会话状态机。
//!
//! ## 核心功能
//!
//! 1. **资源装配**：按配置创建竞赛来源、执行服务、评分接口、全屏控制
//! 2. **事件串行化**：在一个 `tokio::select!` 循环里处理计时节拍、完整性事件、
//!    考生命令和代码执行结果，状态机同一时刻只有一个修改者
//! 3. **异步执行**：代码运行放到独立任务中，结果作为事件送回，不阻塞计时
//! 4. **生命周期**：离开 Active 后立即丢弃计时器和事件源
//! 5. **作答日志**：把提示逐条写入日志文件

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval};
use tracing::{debug, info, warn};

use crate::clients::{
    CodeExecutionApi, ContestApi, ContestClient, ExecutionClient, GradingApi, GradingClient,
    TomlContestSource,
};
use crate::config::Config;
use crate::error::{AppResult, SessionError};
use crate::infrastructure::{
    FullscreenControl, HeadlessFullscreen, HttpExecutor, IntegrityEvent, IntegrityEventSource,
};
use crate::models::{ContestDefinition, QuestionId, SessionStatus, SubmitTrigger};
use crate::orchestrator::command::{answer_from_input, AttemptCommand};
use crate::services::{
    format_clock, AttemptJournal, CheckMode, CodeExecutionGateway, ExecutionOutcome,
};
use crate::utils::logging::truncate_text;
use crate::workflow::{SessionStateMachine, SubmissionCoordinator, SubmitOutcome};

/// 外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub contest_source: Arc<dyn ContestApi>,
    pub execution: Arc<dyn CodeExecutionApi>,
    pub grading: Arc<dyn GradingApi>,
    pub fullscreen: Arc<dyn FullscreenControl>,
}

impl Collaborators {
    /// 按配置创建 HTTP 客户端；设置了竞赛文件时从文件加载竞赛
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let executor = HttpExecutor::new(config)?;

        let contest_source: Arc<dyn ContestApi> = match &config.contest_file {
            Some(path) => {
                info!("📂 使用离线竞赛文件: {}", path);
                Arc::new(TomlContestSource::new(path))
            }
            None => Arc::new(ContestClient::new(executor.clone())),
        };

        Ok(Self {
            contest_source,
            execution: Arc::new(ExecutionClient::new(executor.clone())),
            grading: Arc::new(GradingClient::new(executor)),
            fullscreen: Arc::new(HeadlessFullscreen::new()),
        })
    }
}

/// 后台代码执行任务送回的结果
struct ExecutionMessage {
    question_id: QuestionId,
    result: AppResult<ExecutionOutcome>,
}

/// 作答运行器
pub struct AttemptRunner {
    machine: SessionStateMachine,
    gateway: CodeExecutionGateway,
    coordinator: SubmissionCoordinator,
    fullscreen: Arc<dyn FullscreenControl>,
    tick_interval: Duration,
    journal: Option<AttemptJournal>,
}

impl AttemptRunner {
    /// 拉取竞赛并创建运行器
    pub async fn load(config: &Config, collaborators: Collaborators) -> Result<Self> {
        let contest = collaborators
            .contest_source
            .fetch_contest(config.contest_id)
            .await
            .with_context(|| format!("加载竞赛 {} 失败", config.contest_id))?;

        let journal = AttemptJournal::new(&config.output_log_file);
        let journal = match journal.init(&contest.name).await {
            Ok(()) => Some(journal),
            Err(e) => {
                warn!("作答日志不可用，继续作答: {}", e);
                None
            }
        };

        let runner = Self::from_contest(contest, config, collaborators)?;
        Ok(runner.with_journal(journal))
    }

    /// 用已加载的竞赛创建运行器
    pub fn from_contest(
        contest: ContestDefinition,
        config: &Config,
        collaborators: Collaborators,
    ) -> AppResult<Self> {
        let machine = SessionStateMachine::new(
            contest,
            config.language,
            config.resume_from_server_clock,
        )?;
        let gateway = CodeExecutionGateway::new(collaborators.execution);
        let coordinator = SubmissionCoordinator::new(
            gateway.clone(),
            collaborators.grading,
            collaborators.fullscreen.clone(),
        );

        Ok(Self {
            machine,
            gateway,
            coordinator,
            fullscreen: collaborators.fullscreen,
            tick_interval: config.tick_interval(),
            journal: None,
        })
    }

    pub fn with_journal(mut self, journal: Option<AttemptJournal>) -> Self {
        self.journal = journal;
        self
    }

    pub fn machine(&self) -> &SessionStateMachine {
        &self.machine
    }

    /// 开始作答（也可以通过 `start` 命令触发）
    pub fn start(&mut self) -> AppResult<()> {
        self.machine.start(self.fullscreen.as_ref())?;
        self.log_current_question();
        Ok(())
    }

    /// 事件循环，直到交卷完成或无法继续
    ///
    /// 返回最终的会话状态机
    pub async fn run<S>(
        mut self,
        mut commands: mpsc::Receiver<AttemptCommand>,
        integrity: S,
    ) -> Result<SessionStateMachine>
    where
        S: IntegrityEventSource,
    {
        let (exec_tx, mut exec_rx) = mpsc::unbounded_channel::<ExecutionMessage>();
        let mut ticker: Option<Interval> = None;
        let mut integrity = Some(integrity);
        let mut commands_open = true;

        info!("{} 🚦 事件循环启动", self.machine.ctx());

        loop {
            self.flush_notices().await;

            let status = self.machine.status();
            match status {
                SessionStatus::Completed => break,
                SessionStatus::NotStarted | SessionStatus::Submitting if !commands_open => {
                    warn!("{} 命令通道已关闭，结束作答 (状态 {})", self.machine.ctx(), status);
                    break;
                }
                _ => {}
            }

            // 计时器只在 Active 时存在；事件源在离开 Active 后丢弃
            if status == SessionStatus::Active {
                if ticker.is_none() {
                    let period = self.tick_interval;
                    ticker = Some(interval_at(Instant::now() + period, period));
                }
            } else if ticker.take().is_some() {
                debug!("{} 计时器已停止", self.machine.ctx());
            }
            if status > SessionStatus::Active && integrity.take().is_some() {
                debug!("{} 完整性事件源已关闭", self.machine.ctx());
            }

            tokio::select! {
                _ = next_tick(&mut ticker) => {
                    if let Some(trigger) = self.machine.tick() {
                        self.submit(trigger).await;
                    }
                }
                event = next_integrity_event(&mut integrity) => match event {
                    Some(event) => {
                        if let Some(trigger) = self.machine.handle_integrity_event(event) {
                            self.submit(trigger).await;
                        }
                    }
                    None => {
                        debug!("{} 完整性事件源已结束", self.machine.ctx());
                        integrity = None;
                    }
                },
                Some(message) = exec_rx.recv() => {
                    match message.result {
                        Ok(outcome) => self.machine.apply_execution_outcome(outcome),
                        Err(e) => self.machine.execution_failed(message.question_id, &e),
                    }
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.handle_command(command, &exec_tx).await,
                    None => {
                        commands_open = false;
                        self.machine.input_closed();
                    }
                },
            }
        }

        self.flush_notices().await;
        info!(
            "{} 🏁 事件循环结束，状态 {}",
            self.machine.ctx(),
            self.machine.status()
        );
        Ok(self.machine)
    }

    async fn handle_command(
        &mut self,
        command: AttemptCommand,
        exec_tx: &mpsc::UnboundedSender<ExecutionMessage>,
    ) {
        debug!("{} 命令: {:?}", self.machine.ctx(), command);

        let result = match command {
            AttemptCommand::Start => self.start(),
            AttemptCommand::Next => self.navigate(|m| m.next().map(|_| ())),
            AttemptCommand::Previous => self.navigate(|m| m.previous().map(|_| ())),
            AttemptCommand::GoTo(index) => self.navigate(|m| m.go_to(index)),
            AttemptCommand::Answer { question_id, raw } => {
                match self.machine.contest().question(question_id).map(|q| q.kind) {
                    Some(kind) => self
                        .machine
                        .record_answer(question_id, answer_from_input(kind, &raw)),
                    None => Err(SessionError::UnknownQuestion { question_id }.into()),
                }
            }
            AttemptCommand::Edit(text) => self.machine.edit_current(text),
            AttemptCommand::Run => self.spawn_execution(CheckMode::Run, exec_tx),
            AttemptCommand::Check => self.spawn_execution(CheckMode::SubmitCheck, exec_tx),
            AttemptCommand::Submit => {
                self.machine.request_submit(false);
                Ok(())
            }
            AttemptCommand::Confirm => {
                if let Some(trigger) = self.machine.confirm_submit() {
                    self.submit(trigger).await;
                }
                Ok(())
            }
            AttemptCommand::Cancel => {
                self.machine.cancel_confirmation();
                Ok(())
            }
            AttemptCommand::Retry => {
                let outcome = self.coordinator.retry(&mut self.machine).await;
                self.log_submit_outcome(&outcome);
                Ok(())
            }
            AttemptCommand::SetLanguage(language) => self.machine.set_language(language),
            AttemptCommand::Integrity(event) => {
                if let Some(trigger) = self.machine.handle_integrity_event(event) {
                    self.submit(trigger).await;
                }
                Ok(())
            }
            AttemptCommand::Status => {
                self.log_status();
                Ok(())
            }
        };

        if let Err(e) = result {
            self.machine.reject(&e);
        }
    }

    fn navigate<F>(&mut self, step: F) -> AppResult<()>
    where
        F: FnOnce(&mut SessionStateMachine) -> AppResult<()>,
    {
        let before = self.machine.current_index();
        step(&mut self.machine)?;
        if self.machine.current_index() != before {
            self.log_current_question();
        }
        Ok(())
    }

    /// 把代码执行放到后台任务，结果通过 channel 送回
    fn spawn_execution(
        &mut self,
        mode: CheckMode,
        exec_tx: &mpsc::UnboundedSender<ExecutionMessage>,
    ) -> AppResult<()> {
        let target = self.machine.prepare_execution(mode)?;
        let gateway = self.gateway.clone();
        let exec_tx = exec_tx.clone();

        info!(
            "{} ⏳ 题目 {} {}中...",
            self.machine.ctx(),
            target.question.id,
            mode
        );

        tokio::spawn(async move {
            let result = match target.mode {
                CheckMode::Run => {
                    gateway
                        .run(&target.question, &target.code, target.language)
                        .await
                }
                CheckMode::SubmitCheck => {
                    gateway
                        .submit_check(&target.question, &target.code, target.language)
                        .await
                }
            };
            let message = ExecutionMessage {
                question_id: target.question.id,
                result,
            };
            if exec_tx.send(message).is_err() {
                debug!("事件循环已结束，丢弃执行结果");
            }
        });
        Ok(())
    }

    async fn submit(&mut self, trigger: SubmitTrigger) {
        info!("{} 触发交卷: {}", self.machine.ctx(), trigger);
        self.flush_notices().await;
        let outcome = self.coordinator.submit(&mut self.machine).await;
        self.log_submit_outcome(&outcome);
    }

    fn log_submit_outcome(&self, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Completed(report) => {
                info!("{}", "=".repeat(60));
                info!("🎉 {}", report.message().replace('\n', " | "));
                info!("📊 得分: {}/{}", report.total_score, report.max_score);
                info!("{}", "=".repeat(60));
            }
            SubmitOutcome::Failed(message) => {
                warn!("交卷失败: {} (输入 retry 重试)", message);
            }
            SubmitOutcome::Skipped => {}
        }
    }

    fn log_current_question(&self) {
        let question = self.machine.current_question();
        info!(
            "📄 第 {}/{} 题 [{} | {} 分] {}",
            self.machine.current_index() + 1,
            self.machine.contest().questions.len(),
            question.kind,
            question.score,
            truncate_text(&question.description, 80)
        );
        for (i, option) in question.options.iter().enumerate() {
            info!("   {}. {}", i + 1, option);
        }
    }

    fn log_status(&self) {
        let counts = self.machine.violation_counts();
        info!(
            "{} 状态 {} | 剩余 {} | 第 {} 题 | 已作答 {}/{}",
            self.machine.ctx(),
            self.machine.status(),
            format_clock(self.machine.time_remaining()),
            self.machine.current_index() + 1,
            self.machine.answers().answered_count(),
            self.machine.answers().question_count()
        );
        info!(
            "违规: 切屏 {} | 退出全屏 {} | 导航 {}",
            counts.tab_switch, counts.fullscreen_exit, counts.navigation_attempt
        );
    }

    /// 把新提示写入作答日志
    async fn flush_notices(&mut self) {
        let notices = self.machine.drain_notices();
        let Some(journal) = &self.journal else {
            return;
        };
        for notice in notices {
            if let Err(e) = journal.append(&notice.to_string()).await {
                warn!("写入作答日志失败: {}", e);
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn next_integrity_event<S: IntegrityEventSource>(
    source: &mut Option<S>,
) -> Option<IntegrityEvent> {
    match source {
        Some(source) => source.next_event().await,
        None => std::future::pending().await,
    }
}
