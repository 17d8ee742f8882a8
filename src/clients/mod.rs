//! 外部服务客户端
//!
//! 每个外部协作方一个 trait，HTTP 实现放在同名模块中；
//! 测试和离线模式可以替换成自己的实现

pub mod contest_client;
pub mod execution_client;
pub mod grading_client;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    ContestDefinition, ExecutionRequest, GradingResponse, SubmissionPayload, TestCaseResult,
};

pub use contest_client::{ContestClient, TomlContestSource};
pub use execution_client::ExecutionClient;
pub use grading_client::GradingClient;

/// 竞赛拉取
#[async_trait]
pub trait ContestApi: Send + Sync {
    async fn fetch_contest(&self, contest_id: i64) -> AppResult<ContestDefinition>;
}

/// 代码执行服务
#[async_trait]
pub trait CodeExecutionApi: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> AppResult<Vec<TestCaseResult>>;
}

/// 评分接口
#[async_trait]
pub trait GradingApi: Send + Sync {
    async fn submit(
        &self,
        contest_id: i64,
        payload: &SubmissionPayload,
    ) -> AppResult<GradingResponse>;
}
