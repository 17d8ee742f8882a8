use thiserror::Error;

use crate::models::{QuestionId, QuestionKind, SessionStatus};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误（竞赛拉取 / 代码执行 / 评分提交）
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 会话状态相关错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误响应
    #[error("API返回错误响应 ({endpoint}): status={status}, message={message}")]
    BadResponse {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 会话状态相关错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 当前状态不允许该操作
    #[error("当前状态 {status} 不允许该操作")]
    InvalidStatus { status: SessionStatus },
    /// 题目不存在
    #[error("题目 {question_id} 不存在")]
    UnknownQuestion { question_id: QuestionId },
    /// 答案类型与题型不符
    #[error("题目 {question_id} ({kind}) 不接受该类型的答案")]
    AnswerKindMismatch {
        question_id: QuestionId,
        kind: QuestionKind,
    },
    /// 题目索引超出范围
    #[error("题目索引 {index} 超出范围 [0, {count})")]
    QuestionIndexOutOfRange { index: usize, count: usize },
    /// 非编程题不能运行代码
    #[error("题目 {question_id} 不是编程题")]
    NotCodingQuestion { question_id: QuestionId },
    /// 竞赛定义不合法
    #[error("竞赛定义不合法: {reason}")]
    InvalidContest { reason: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少必要配置
    #[error("缺少必要配置 {var_name}")]
    MissingValue { var_name: String },
    /// 不支持的编程语言
    #[error("不支持的编程语言: {value}")]
    UnsupportedLanguage { value: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建API错误响应
    pub fn bad_response(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        AppError::Api(ApiError::BadResponse {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        })
    }

    /// 创建状态不允许错误
    pub fn invalid_status(status: SessionStatus) -> Self {
        AppError::Session(SessionError::InvalidStatus { status })
    }

    /// 面向考生展示的错误信息
    ///
    /// 服务端返回的 `error` 字段原样展示，其余错误使用 Display
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::BadResponse { message, .. }) => message.clone(),
            AppError::Api(ApiError::RequestFailed { .. }) => {
                "Network error, please check your connection and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
