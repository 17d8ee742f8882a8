/// 竞赛拉取客户端
///
/// 在线模式请求作答接口，离线模式读取 TOML 文件
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::clients::ContestApi;
use crate::error::AppResult;
use crate::infrastructure::HttpExecutor;
use crate::models::{load_contest_from_toml, ContestDefinition};

/// 作答接口路径
pub fn attempt_path(contest_id: i64) -> String {
    format!("api/contests/student/attempt/{}/", contest_id)
}

/// 竞赛拉取客户端
pub struct ContestClient {
    executor: HttpExecutor,
}

impl ContestClient {
    pub fn new(executor: HttpExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ContestApi for ContestClient {
    async fn fetch_contest(&self, contest_id: i64) -> AppResult<ContestDefinition> {
        debug!("拉取竞赛 {}", contest_id);

        let contest: ContestDefinition = self.executor.get_json(&attempt_path(contest_id)).await?;
        contest.validate()?;

        info!(
            "✓ 竞赛 {} 加载完成: {} 道题目, 剩余 {:?} 秒",
            contest.name,
            contest.questions.len(),
            contest.time_remaining
        );
        Ok(contest)
    }
}

/// 离线竞赛来源，忽略传入的竞赛ID
pub struct TomlContestSource {
    path: PathBuf,
}

impl TomlContestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContestApi for TomlContestSource {
    async fn fetch_contest(&self, _contest_id: i64) -> AppResult<ContestDefinition> {
        load_contest_from_toml(&self.path).await
    }
}
