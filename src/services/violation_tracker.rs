//! 违规计数服务 - 业务能力层
//!
//! 只负责"按类别计数、判断是否达到交卷阈值"，不关心交卷流程

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::ViolationCategory;

/// 任一类别达到该次数即自动交卷
pub const VIOLATION_THRESHOLD: u32 = 3;

/// 一次记录的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationOutcome {
    pub category: ViolationCategory,
    /// 记录后的次数
    pub count: u32,
    /// 本次记录是否首次达到阈值（每个类别只会为真一次）
    pub threshold_reached: bool,
}

impl ViolationOutcome {
    pub fn remaining(&self) -> u32 {
        VIOLATION_THRESHOLD.saturating_sub(self.count)
    }

    /// 展示给考生的警告文案
    pub fn warning_message(&self) -> String {
        if self.count >= VIOLATION_THRESHOLD {
            return format!("Too many {} attempts. Submitting test.", self.category);
        }
        let remaining = self.remaining();
        format!(
            "Warning: {} detected. Test will end after {} more attempt{}.",
            capitalize(self.category.label()),
            remaining,
            if remaining > 1 { "s" } else { "" }
        )
    }
}

/// 各类别的计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub tab_switch: u32,
    pub fullscreen_exit: u32,
    pub navigation_attempt: u32,
}

/// 违规计数器
///
/// 职责：
/// - 各类别独立计数，不做去抖
/// - 每个类别达到阈值时只报告一次
/// - 冻结后不再计数
#[derive(Debug, Default)]
pub struct ViolationTracker {
    counts: [u32; 3],
    tripped: [bool; 3],
    frozen: bool,
}

impl ViolationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次违规；冻结后返回 `None`
    pub fn record_violation(&mut self, category: ViolationCategory) -> Option<ViolationOutcome> {
        if self.frozen {
            debug!("违规计数已冻结，忽略 {}", category);
            return None;
        }

        let slot = category.index();
        self.counts[slot] = self.counts[slot].saturating_add(1);
        let count = self.counts[slot];

        let threshold_reached = count >= VIOLATION_THRESHOLD && !self.tripped[slot];
        if threshold_reached {
            self.tripped[slot] = true;
            warn!("⚠️ {} 次数达到上限 ({})", category, count);
        } else {
            debug!("记录违规 {}: 第 {} 次", category, count);
        }

        Some(ViolationOutcome {
            category,
            count,
            threshold_reached,
        })
    }

    pub fn count(&self, category: ViolationCategory) -> u32 {
        self.counts[category.index()]
    }

    pub fn counts(&self) -> ViolationCounts {
        ViolationCounts {
            tab_switch: self.count(ViolationCategory::TabSwitch),
            fullscreen_exit: self.count(ViolationCategory::FullscreenExit),
            navigation_attempt: self.count(ViolationCategory::NavigationAttempt),
        }
    }

    /// 会话离开作答状态后冻结计数
    pub fn freeze(&mut self) {
        self.frozen = true;
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
