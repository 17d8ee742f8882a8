//! 倒计时服务 - 业务能力层
//!
//! 每个节拍减一秒，到零时只发出一次超时信号并停止

use tracing::debug;

/// 单个节拍的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// 仍在计时
    Running { remaining: u64 },
    /// 本次节拍归零（只会出现一次）
    Expired,
    /// 计时器未运行
    Idle,
}

#[derive(Debug, Default)]
pub struct CountdownTimer {
    remaining: u64,
    running: bool,
    expired_signalled: bool,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始计时；已经发出过超时信号的计时器不会重新开始
    pub fn start(&mut self, seconds: u64) {
        if self.expired_signalled {
            return;
        }
        self.remaining = seconds;
        self.running = true;
        debug!("倒计时开始: {}", format_clock(seconds));
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return TickOutcome::Running {
                remaining: self.remaining,
            };
        }

        self.running = false;
        if self.expired_signalled {
            TickOutcome::Idle
        } else {
            self.expired_signalled = true;
            TickOutcome::Expired
        }
    }

    /// 立即停止，之后的节拍都是 Idle
    pub fn stop(&mut self) {
        if self.running {
            debug!("倒计时停止，剩余 {}", format_clock(self.remaining));
        }
        self.running = false;
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// 把秒数格式化为 MM:SS（超过一小时为 H:MM:SS）
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}
