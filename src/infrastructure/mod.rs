pub mod fullscreen;
pub mod http_executor;
pub mod integrity;

pub use fullscreen::{FullscreenControl, HeadlessFullscreen};
pub use http_executor::HttpExecutor;
pub use integrity::{ChannelIntegritySource, IntegrityEvent, IntegrityEventSource};
