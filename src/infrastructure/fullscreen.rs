//! 全屏控制 - 基础设施层
//!
//! 请求与退出全屏都是尽力而为，失败只提示不阻塞

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{AppError, AppResult};

pub trait FullscreenControl: Send + Sync {
    fn request_fullscreen(&self) -> AppResult<()>;
    fn exit_fullscreen(&self) -> AppResult<()>;
}

/// 无界面环境下的全屏控制，只记录状态
#[derive(Debug)]
pub struct HeadlessFullscreen {
    supported: bool,
    active: AtomicBool,
}

impl HeadlessFullscreen {
    pub fn new() -> Self {
        Self {
            supported: true,
            active: AtomicBool::new(false),
        }
    }

    /// 模拟不支持全屏的环境，请求总是失败
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for HeadlessFullscreen {
    fn default() -> Self {
        Self::new()
    }
}

impl FullscreenControl for HeadlessFullscreen {
    fn request_fullscreen(&self) -> AppResult<()> {
        if !self.supported {
            return Err(AppError::Other("fullscreen is not supported".to_string()));
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn exit_fullscreen(&self) -> AppResult<()> {
        self.active.store(false, Ordering::SeqCst);
        Ok(())
    }
}
