//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责装配资源和调度事件，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `attempt_runner` - 作答运行器
//! - 按配置装配外部协作方（HTTP 或离线文件）
//! - 唯一持有 SessionStateMachine
//! - 在一个 select 循环中串行处理计时、完整性事件、考生命令、执行结果
//! - 把代码执行放到独立任务中
//! - 写作答日志
//!
//! ### `command` - 命令解析
//! - 把命令行文本解析成 AttemptCommand
//! - 按题型把输入转换成答案
//!
//! ## 层次关系
//!
//! ```text
//! attempt_runner (事件循环)
//!     ↓
//! workflow::SessionStateMachine / SubmissionCoordinator
//!     ↓
//! services (能力层：计时 / 违规 / 答案 / 执行网关)
//!     ↓
//! clients + infrastructure (HttpExecutor / 事件源 / 全屏)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一修改者**：只有运行器的事件循环修改会话状态
//! 2. **不阻塞计时**：代码执行的网络调用不在事件循环里等待
//! 3. **向下依赖**：编排层 → workflow → services → clients/infrastructure

pub mod attempt_runner;
pub mod command;

// 重新导出主要类型
pub use attempt_runner::{AttemptRunner, Collaborators};
pub use command::{answer_from_input, AttemptCommand, CommandParser};
