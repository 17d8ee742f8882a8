//! 提示面板 - 业务能力层
//!
//! 收集展示给考生的提示，同时写入日志

use chrono::Local;
use tracing::{error, info, warn};

use crate::models::{Notice, NoticeLevel};

#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Info => info!("💬 {}", message),
            NoticeLevel::Warning => warn!("⚠️ {}", message),
            NoticeLevel::Error => error!("❌ {}", message),
        }
        self.notices.push(Notice {
            level,
            message,
            at: Local::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// 取出所有未读提示
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
