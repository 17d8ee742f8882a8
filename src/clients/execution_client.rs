/// 代码执行客户端
///
/// 运行与全量检测都走同一个执行接口，区别只在于传入的用例集合
use async_trait::async_trait;
use tracing::debug;

use crate::clients::CodeExecutionApi;
use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{ExecutionRequest, ExecutionResponse, TestCaseResult};

const RUN_PATH: &str = "api/contests/code_execution/run";

pub struct ExecutionClient {
    executor: HttpExecutor,
}

impl ExecutionClient {
    pub fn new(executor: HttpExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl CodeExecutionApi for ExecutionClient {
    async fn execute(&self, request: &ExecutionRequest) -> AppResult<Vec<TestCaseResult>> {
        debug!(
            "提交代码执行: 语言 {}, {} 个用例, 时限 {} 秒",
            request.language,
            request.test_cases.len(),
            request.time_limit_seconds
        );

        let response: ExecutionResponse = self.executor.post_json(RUN_PATH, request).await?;

        debug!("代码执行完成，返回 {} 个结果", response.results.len());
        Ok(response.results)
    }
}
