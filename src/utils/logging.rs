/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化 tracing 日志
///
/// `RUST_LOG` 优先；否则按 `verbose` 决定 debug 还是 info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("contest_attempt={},warn", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 竞赛作答模式");
    match &config.contest_file {
        Some(path) => info!("📂 竞赛文件: {}", path),
        None => info!("🌐 后端: {} | 竞赛ID: {}", config.api_base_url, config.contest_id),
    }
    info!(
        "💻 语言: {} | 节拍: {} ms | 日志: {}",
        config.language, config.tick_interval_ms, config.output_log_file
    );
    info!("{}", "=".repeat(60));
}

/// 打印命令帮助
pub fn log_help() {
    info!("可用命令:");
    info!("  start | next | prev | goto N | status");
    info!("  answer ID VALUE (多选用逗号分隔) | edit TEXT (\\n 换行)");
    info!("  run | check | submit | confirm | cancel | retry | lang L");
    info!("  !tab | !visible | !fullscreen | !back | !unload (模拟页面事件)");
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
