use std::io::BufRead;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use contest_attempt::utils::logging;
use contest_attempt::{
    AttemptCommand, AttemptRunner, ChannelIntegritySource, Collaborators, CommandParser, Config,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env().context("读取配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);
    config.validate()?;

    // 装配外部协作方并加载竞赛
    let collaborators = Collaborators::from_config(&config)?;
    let runner = AttemptRunner::load(&config, collaborators).await?;

    let (command_tx, command_rx) = mpsc::channel(32);
    let (integrity_tx, integrity_source) = ChannelIntegritySource::channel();

    // 读取标准输入：页面事件走事件源，其余走命令通道
    // 使用独立线程阻塞读取，进程退出时不会等待它
    let parser = CommandParser::new()?;
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("读取标准输入失败: {}", e);
                    break;
                }
            };

            match parser.parse(&line) {
                Ok(Some(AttemptCommand::Integrity(event))) => {
                    if integrity_tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(Some(command)) => {
                    if command_tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("{}", e),
            }
        }
    });

    logging::log_help();
    info!("输入 start 开始作答");

    let machine = runner.run(command_rx, integrity_source).await?;

    if let Some(report) = machine.report() {
        info!("最终得分: {}/{}", report.total_score, report.max_score);
    }
    Ok(())
}
