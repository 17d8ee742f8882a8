//! HTTP 执行器 - 基础设施层
//!
//! 持有唯一的 reqwest::Client 与凭证，只暴露"发 JSON 请求"的能力

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};

/// HTTP 执行器
///
/// 职责：
/// - 持有 Client、根地址与 Bearer 凭证
/// - 暴露 get_json() / post_json() 能力
/// - 不认识 Contest / Question
/// - 不处理业务流程
///
/// Client 内部使用 Arc，clone 是廉价的
///
/// 总超时按请求设置，连接超时挂在 Client 上；
/// `None` 表示请求发出后一直等待响应
#[derive(Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
    token: String,
    request_timeout: Option<Duration>,
}

impl HttpExecutor {
    /// 创建新的 HTTP 执行器
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::api_request_failed(&config.api_base_url, e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            token: config.access_token.clone(),
            request_timeout: Some(config.request_timeout()),
        })
    }

    /// 共享同一个 Client，但不限制请求总时长（仍保留连接超时）
    pub fn without_request_timeout(&self) -> Self {
        Self {
            request_timeout: None,
            ..self.clone()
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    fn with_timeout(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.request_timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        }
    }

    /// 拼接完整的接口地址
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// 发送 GET 请求并反序列化响应
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let endpoint = self.endpoint(path);
        debug!("GET {}", endpoint);

        let response = self
            .with_timeout(self.client.get(&endpoint))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        decode(&endpoint, response).await
    }

    /// 发送 POST 请求（JSON 请求体）并反序列化响应
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = self.endpoint(path);
        debug!("POST {}", endpoint);

        let response = self
            .with_timeout(self.client.post(&endpoint))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        decode(&endpoint, response).await
    }
}

/// 检查状态码并解析响应体
async fn decode<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::api_request_failed(endpoint, e))?;

    if !status.is_success() {
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(AppError::bad_response(endpoint, status.as_u16(), message));
    }

    serde_json::from_str(&body).map_err(|source| {
        ApiError::JsonParseFailed {
            endpoint: endpoint.to_string(),
            source,
        }
        .into()
    })
}

/// 从错误响应体中提取可读信息：`{"error": "...", "details": "..."}`
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = value.get("error").and_then(|v| v.as_str())?;

    match value.get("details").and_then(|v| v.as_str()) {
        Some(details) if !details.trim().is_empty() => {
            Some(format!("{}: {}", error, details.trim()))
        }
        _ => Some(error.to_string()),
    }
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
