// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::settings::CrawlSettings;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// URL 无效
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// 代理配置无效
    #[error("Invalid proxy: {0}")]
    InvalidProxy(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 会话已关闭
    #[error("Session closed")]
    SessionClosed,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断错误是否为超时
    pub fn is_timeout(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout(),
            EngineError::Timeout => true,
            _ => false,
        }
    }
}

/// 爬取会话选项
///
/// 这些是传给爬取能力的配置，本身不决定调度行为
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// 单次抓取超时时间
    pub timeout: Duration,
    /// 并行抓取上限
    pub parallelism: usize,
    /// 每秒请求数上限
    pub rate_limit: u32,
    /// 爬取深度
    pub max_depth: u32,
    /// 爬取策略
    pub strategy: String,
    /// 响应体最大读取字节数
    pub body_read_size: usize,
    pub headless: bool,
    pub tech_detect: bool,
    pub xhr_extraction: bool,
}

impl From<&CrawlSettings> for CrawlOptions {
    fn from(settings: &CrawlSettings) -> Self {
        Self {
            timeout: settings.timeout(),
            parallelism: settings.parallelism,
            rate_limit: settings.rate_limit,
            max_depth: settings.max_depth,
            strategy: settings.strategy.clone(),
            body_read_size: settings.body_read_size,
            headless: settings.headless,
            tech_detect: settings.tech_detect,
            xhr_extraction: settings.xhr_extraction,
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            parallelism: 10,
            rate_limit: 150,
            max_depth: 0,
            strategy: "depth-first".to_string(),
            body_read_size: 16 * 1024 * 1024,
            headless: true,
            tech_detect: true,
            xhr_extraction: true,
        }
    }
}

/// 单次爬取请求
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    /// 目标URL
    pub url: String,
    /// 代理配置 (URL)
    pub proxy: String,
}

/// 爬取能力返回的页面响应
#[derive(Debug, Clone, Default)]
pub struct PageResponse {
    /// 最终请求的URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 内容长度，未知时为 -1
    pub content_length: i64,
    /// 响应头
    pub headers: HashMap<String, String>,
    /// 响应体
    pub body: String,
    pub forms: Vec<serde_json::Value>,
    pub xhr_requests: Vec<serde_json::Value>,
    pub technologies: Vec<String>,
    pub raw: Option<String>,
    pub stored_response_path: Option<String>,
}

/// 回调收到的页面结果
#[derive(Debug, Clone)]
pub struct PageResult {
    /// 请求的URL
    pub url: String,
    /// 结果时间
    pub timestamp: DateTime<Utc>,
    /// 响应，没有拿到时为 None
    pub response: Option<PageResponse>,
    /// 错误描述
    pub error: Option<String>,
    /// 是否因超时失败
    pub timed_out: bool,
}

impl PageResult {
    /// 拿到响应的结果
    pub fn success(url: impl Into<String>, response: PageResponse) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
            response: Some(response),
            error: None,
            timed_out: false,
        }
    }

    /// 没有响应的结果，保留错误描述和是否超时
    pub fn failure(url: impl Into<String>, error: &EngineError) -> Self {
        Self {
            url: url.into(),
            timestamp: Utc::now(),
            response: None,
            error: Some(error.to_string()),
            timed_out: error.is_timeout(),
        }
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }
}

/// 结果回调
///
/// 由爬取能力异步调用，可能在 `crawl` 返回之前或之后触发
pub type ResultCallback = Arc<dyn Fn(PageResult) + Send + Sync>;

/// 爬取会话特质
#[async_trait]
pub trait CrawlSession: Send + Sync {
    /// 发起一次爬取，结果通过回调送达
    async fn crawl(&self, request: CrawlRequest, on_result: ResultCallback)
        -> Result<(), EngineError>;
}

/// 爬取能力特质
#[async_trait]
pub trait CrawlCapability: Send + Sync {
    /// 创建新的爬取会话
    async fn new_session(&self, options: CrawlOptions)
        -> Result<Arc<dyn CrawlSession>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}
