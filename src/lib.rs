//! # Contest Attempt
//!
//! 限时、带监考的竞赛作答客户端
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 持有外部资源，只暴露能力
//! - `HttpExecutor` - 唯一的 HTTP client owner，统一鉴权与错误解析
//! - `IntegrityEventSource` / `FullscreenControl` - 页面事件与全屏的可替换接口
//! - `clients/` - 竞赛拉取、代码执行、评分三个外部接口
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，彼此独立
//! - `ViolationTracker` - 违规计数与阈值
//! - `CountdownTimer` - 倒计时
//! - `AnswerBuffer` - 答案缓冲
//! - `CodeExecutionGateway` - 运行 / 全量检测
//! - `AttemptJournal` - 写作答日志
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次作答"的状态与交卷流程
//! - `SessionStateMachine` - 会话状态机（唯一的状态持有者）
//! - `SubmissionCoordinator` - 交卷流程（全量检测 → 载荷 → 评分 → 回写）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/attempt_runner` - 事件循环，串行化所有事件
//! - `orchestrator/command` - 命令行命令解析
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChannelIntegritySource, HeadlessFullscreen, IntegrityEvent};
pub use models::{ContestDefinition, Language, Question, SessionStatus};
pub use orchestrator::{AttemptCommand, AttemptRunner, Collaborators, CommandParser};
pub use workflow::{SessionStateMachine, SubmissionCoordinator, SubmitOutcome};
