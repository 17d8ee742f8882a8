use std::time::Duration;

use crate::error::{AppResult, ConfigError};
use crate::models::Language;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端 API 根地址
    pub api_base_url: String,
    /// Bearer 凭证（生命周期不由本程序管理）
    pub access_token: String,
    /// 要作答的竞赛ID
    pub contest_id: i64,
    /// 离线竞赛文件（TOML），设置后不再请求竞赛接口
    pub contest_file: Option<String>,
    /// 编程题默认语言
    pub language: Language,
    /// 计时器节拍间隔（毫秒）
    pub tick_interval_ms: u64,
    /// 开始作答时是否沿用服务端返回的剩余时间
    pub resume_from_server_clock: bool,
    /// 单个 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 作答日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            access_token: String::new(),
            contest_id: 0,
            contest_file: None,
            language: Language::Python,
            tick_interval_ms: 1000,
            resume_from_server_clock: false,
            request_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "attempt.log".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，缺失的项使用默认值
    pub fn from_env() -> AppResult<Self> {
        let default = Self::default();
        Ok(Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(default.api_base_url),
            access_token: std::env::var("ACCESS_TOKEN").unwrap_or(default.access_token),
            contest_id: parse_env("CONTEST_ID", "i64")?.unwrap_or(default.contest_id),
            contest_file: std::env::var("CONTEST_FILE").ok().filter(|v| !v.trim().is_empty()),
            language: match std::env::var("LANGUAGE") {
                Ok(v) => v.parse()?,
                Err(_) => default.language,
            },
            tick_interval_ms: parse_env("TICK_INTERVAL_MS", "u64")?
                .unwrap_or(default.tick_interval_ms),
            resume_from_server_clock: parse_env("RESUME_FROM_SERVER_CLOCK", "bool")?
                .unwrap_or(default.resume_from_server_clock),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            verbose_logging: parse_env("VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// 在真正发起请求前检查必要项
    pub fn validate(&self) -> AppResult<()> {
        if self.contest_file.is_none() {
            if self.contest_id <= 0 {
                return Err(ConfigError::MissingValue {
                    var_name: "CONTEST_ID".to_string(),
                }
                .into());
            }
            if self.access_token.is_empty() {
                return Err(ConfigError::MissingValue {
                    var_name: "ACCESS_TOKEN".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// 读取并解析单个环境变量；变量不存在时返回 `None`
fn parse_env<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> AppResult<Option<T>> {
    match std::env::var(var_name) {
        Ok(value) => value.trim().parse::<T>().map(Some).map_err(|_| {
            ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }
            .into()
        }),
        Err(_) => Ok(None),
    }
}
