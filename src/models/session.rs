use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 会话状态（单调前进，不会回退）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    NotStarted,
    Active,
    Submitting,
    Completed,
}

impl SessionStatus {
    pub fn name(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "NotStarted",
            SessionStatus::Active => "Active",
            SessionStatus::Submitting => "Submitting",
            SessionStatus::Completed => "Completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 违规类别，各自独立计数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationCategory {
    TabSwitch,
    FullscreenExit,
    NavigationAttempt,
}

impl ViolationCategory {
    pub(crate) fn index(self) -> usize {
        match self {
            ViolationCategory::TabSwitch => 0,
            ViolationCategory::FullscreenExit => 1,
            ViolationCategory::NavigationAttempt => 2,
        }
    }

    /// 提示文案中使用的名称
    pub fn label(self) -> &'static str {
        match self {
            ViolationCategory::TabSwitch => "tab switch",
            ViolationCategory::FullscreenExit => "fullscreen exit",
            ViolationCategory::NavigationAttempt => "navigation",
        }
    }
}

impl std::fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 触发交卷的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitTrigger {
    /// 考生确认交卷
    UserConfirmed,
    /// 时间用尽
    Timeout,
    /// 某类违规达到阈值
    ViolationThreshold(ViolationCategory),
}

impl std::fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitTrigger::UserConfirmed => write!(f, "考生交卷"),
            SubmitTrigger::Timeout => write!(f, "时间用尽"),
            SubmitTrigger::ViolationThreshold(category) => write!(f, "违规达到上限 ({})", category),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// 展示给考生的一条提示
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Local>,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.level {
            NoticeLevel::Info => "INFO",
            NoticeLevel::Warning => "WARN",
            NoticeLevel::Error => "ERROR",
        };
        write!(f, "[{}] {} {}", self.at.format("%H:%M:%S"), tag, self.message)
    }
}
