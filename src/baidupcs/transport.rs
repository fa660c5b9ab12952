//! HTTP 传输层
//!
//! 转存流程只需要“发请求、拿响应体”，这里把它抽成 [`Transport`]，
//! 默认实现基于 `reqwest::Client`，测试里可以换成脚本化的实现。

use async_trait::async_trait;
use reqwest::{Client, Method};
use tracing::debug;

use super::error::TransportError;

/// 一次请求
#[derive(Debug, Clone)]
pub struct PanRequest {
    pub method: Method,
    pub url: String,
    /// 非空时以 x-www-form-urlencoded 提交
    pub form: Vec<(String, String)>,
    pub headers: Vec<(&'static str, String)>,
}

impl PanRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            form: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn form_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((key.into(), value.into()));
        self
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// 发送请求并读完整个响应体
    async fn send(&self, request: PanRequest) -> Result<String, TransportError>;
}

/// 基于 reqwest 的实现，每个请求都带上配置的 User-Agent
pub struct HttpTransport {
    client: Client,
    user_agent: String,
}

impl HttpTransport {
    pub fn new(client: Client, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PanRequest) -> Result<String, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .header("User-Agent", &self.user_agent);

        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        if request.method == Method::POST {
            builder = builder.form(&request.form);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        debug!("📡 {} {} -> {}", request.method, request.url, resp.status());

        resp.text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}
