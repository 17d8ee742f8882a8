/// 评分客户端
///
/// 只负责把交卷载荷发出去，重复提交的防护在会话层
use async_trait::async_trait;
use tracing::{debug, info};

use crate::clients::GradingApi;
use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{GradingResponse, SubmissionPayload};

pub fn submit_path(contest_id: i64) -> String {
    format!("api/contests/contests/{}/submit", contest_id)
}

pub struct GradingClient {
    executor: HttpExecutor,
}

impl GradingClient {
    /// 交卷请求一旦发出就等待服务端评分完成，不设总超时
    pub fn new(executor: HttpExecutor) -> Self {
        Self {
            executor: executor.without_request_timeout(),
        }
    }
}

#[async_trait]
impl GradingApi for GradingClient {
    async fn submit(
        &self,
        contest_id: i64,
        payload: &SubmissionPayload,
    ) -> AppResult<GradingResponse> {
        info!(
            "📤 正在交卷: 竞赛 {}, {} 道题目",
            contest_id,
            payload.submission.len()
        );
        debug!(
            "交卷违规计数: 切屏 {}, 退出全屏 {}",
            payload.tab_switch_count, payload.fullscreen_exit_count
        );

        let response: GradingResponse = self
            .executor
            .post_json(&submit_path(contest_id), payload)
            .await?;

        debug!("评分结果: {} 条", response.results.len());
        Ok(response)
    }
}
