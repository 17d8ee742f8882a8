use std::path::Path;

use tokio::fs;

use crate::error::{AppResult, FileError};
use crate::models::contest::ContestDefinition;

/// 从 TOML 文件加载竞赛定义（离线作答时使用）
pub async fn load_contest_from_toml(toml_file_path: &Path) -> AppResult<ContestDefinition> {
    let path = toml_file_path.display().to_string();

    if !toml_file_path.exists() {
        return Err(FileError::NotFound { path }.into());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| FileError::ReadFailed {
            path: path.clone(),
            source,
        })?;

    let contest = parse_contest_toml(&content, &path)?;

    tracing::info!(
        "成功加载竞赛 {}，共 {} 道题目",
        contest.name,
        contest.questions.len()
    );

    Ok(contest)
}

/// 解析 TOML 文本；`origin` 只用于错误信息
pub fn parse_contest_toml(content: &str, origin: &str) -> AppResult<ContestDefinition> {
    let contest: ContestDefinition =
        toml::from_str(content).map_err(|source| FileError::TomlParseFailed {
            path: origin.to_string(),
            source,
        })?;
    contest.validate()?;
    Ok(contest)
}
