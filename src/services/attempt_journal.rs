//! 作答日志 - 业务能力层
//!
//! 只负责"把作答过程中的关键事件追加写入日志文件"，不关心流程

use std::path::PathBuf;

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppResult, FileError};

/// 作答日志
///
/// 职责：
/// - 创建带时间戳标题的日志文件
/// - 逐行追加事件（提示、状态变化、交卷结果）
pub struct AttemptJournal {
    path: PathBuf,
}

impl AttemptJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 覆盖写入日志标题
    pub async fn init(&self, contest_name: &str) -> AppResult<()> {
        let header = format!(
            "{}\n作答日志 - {} - {}\n{}\n\n",
            "=".repeat(60),
            contest_name,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        fs::write(&self.path, header)
            .await
            .map_err(|source| self.write_failed(source))?;
        Ok(())
    }

    /// 追加一行
    pub async fn append(&self, line: &str) -> AppResult<()> {
        debug!("写入作答日志: {}", line);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| self.write_failed(source))?;

        let entry = format!("{}\n", line);
        file.write_all(entry.as_bytes())
            .await
            .map_err(|source| self.write_failed(source))?;
        Ok(())
    }

    fn write_failed(&self, source: std::io::Error) -> FileError {
        FileError::WriteFailed {
            path: self.path.display().to_string(),
            source,
        }
    }
}
