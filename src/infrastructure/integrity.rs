//! 完整性事件源 - 基础设施层
//!
//! 把页面可见性、全屏变化、历史导航、离开页面等外部信号抽象成事件流，
//! 会话层只消费事件，不关心事件来自真实页面还是测试注入

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::models::ViolationCategory;

/// 外部完整性事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityEvent {
    /// 页面变为不可见（切换标签页 / 最小化）
    VisibilityHidden,
    VisibilityVisible,
    /// 退出全屏
    FullscreenExited,
    FullscreenEntered,
    /// 浏览器前进 / 后退
    HistoryNavigation,
    /// 刷新或关闭页面
    BeforeUnload,
}

impl IntegrityEvent {
    /// 事件对应的违规类别；恢复类事件不计数
    pub fn category(self) -> Option<ViolationCategory> {
        match self {
            IntegrityEvent::VisibilityHidden => Some(ViolationCategory::TabSwitch),
            IntegrityEvent::FullscreenExited => Some(ViolationCategory::FullscreenExit),
            IntegrityEvent::HistoryNavigation | IntegrityEvent::BeforeUnload => {
                Some(ViolationCategory::NavigationAttempt)
            }
            IntegrityEvent::VisibilityVisible | IntegrityEvent::FullscreenEntered => None,
        }
    }
}

/// 完整性事件源
///
/// 返回 `None` 表示事件源已关闭
#[async_trait]
pub trait IntegrityEventSource: Send {
    async fn next_event(&mut self) -> Option<IntegrityEvent>;
}

/// 基于 channel 的事件源，发送端交给页面桥接层或测试
pub struct ChannelIntegritySource {
    receiver: mpsc::UnboundedReceiver<IntegrityEvent>,
}

impl ChannelIntegritySource {
    /// 创建事件源及其发送端
    pub fn channel() -> (mpsc::UnboundedSender<IntegrityEvent>, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (sender, Self { receiver })
    }
}

#[async_trait]
impl IntegrityEventSource for ChannelIntegritySource {
    async fn next_event(&mut self) -> Option<IntegrityEvent> {
        self.receiver.recv().await
    }
}
