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

use crate::engines::traits::{
    CrawlCapability, CrawlOptions, CrawlRequest, CrawlSession, EngineError, PageResponse,
    PageResult, ResultCallback,
};
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; dispatchrs/1.0)";

/// 基于reqwest的爬取能力
///
/// 每个会话共享限流器和并行上限，每次请求使用独立客户端以隔离 cookie 和代理
pub struct ReqwestCapability;

#[async_trait]
impl CrawlCapability for ReqwestCapability {
    async fn new_session(
        &self,
        options: CrawlOptions,
    ) -> Result<Arc<dyn CrawlSession>, EngineError> {
        let rate = NonZeroU32::new(options.rate_limit)
            .ok_or_else(|| EngineError::Other("rate_limit must be at least 1".to_string()))?;
        if options.parallelism == 0 {
            return Err(EngineError::Other(
                "parallelism must be at least 1".to_string(),
            ));
        }

        Ok(Arc::new(ReqwestSession {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
            permits: Arc::new(Semaphore::new(options.parallelism)),
            options,
        }))
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

/// reqwest 爬取会话
pub struct ReqwestSession {
    limiter: Arc<DefaultDirectRateLimiter>,
    permits: Arc<Semaphore>,
    options: CrawlOptions,
}

impl ReqwestSession {
    fn build_client(&self, proxy: &str) -> Result<reqwest::Client, EngineError> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| EngineError::InvalidProxy(format!("{}: {}", proxy, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.options.timeout)
            .cookie_store(true)
            .proxy(proxy)
            .build()?;
        Ok(client)
    }
}

#[async_trait]
impl CrawlSession for ReqwestSession {
    /// 校验请求并在后台发起抓取
    ///
    /// URL 或代理无效时同步返回错误；否则立即返回，结果通过回调送达
    async fn crawl(
        &self,
        request: CrawlRequest,
        on_result: ResultCallback,
    ) -> Result<(), EngineError> {
        let parsed = url::Url::parse(&request.url)
            .map_err(|e| EngineError::InvalidUrl(format!("{}: {}", request.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(EngineError::InvalidUrl(format!(
                "unsupported scheme: {}",
                parsed.scheme()
            )));
        }

        let client = self.build_client(&request.proxy)?;
        let limiter = self.limiter.clone();
        let permits = self.permits.clone();
        let body_read_size = self.options.body_read_size;

        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    on_result(PageResult::failure(request.url, &EngineError::SessionClosed));
                    return;
                }
            };
            limiter.until_ready().await;

            let result = match fetch(&client, parsed, body_read_size).await {
                Ok(response) => PageResult::success(request.url, response),
                Err(e) => {
                    warn!("Error crawling {}: {}", request.url, e);
                    PageResult::failure(request.url, &e)
                }
            };
            on_result(result);
        });

        Ok(())
    }
}

async fn fetch(
    client: &reqwest::Client,
    url: url::Url,
    body_read_size: usize,
) -> Result<PageResponse, EngineError> {
    let response = client.get(url).send().await?;

    let final_url = response.url().to_string();
    let status_code = response.status().as_u16();
    let declared_length = response.content_length();

    let mut headers = HashMap::new();
    for (k, v) in response.headers() {
        if let Ok(v_str) = v.to_str() {
            headers.insert(k.as_str().to_string(), v_str.to_string());
        }
    }

    let bytes = response.bytes().await?;
    let truncated = &bytes[..bytes.len().min(body_read_size)];
    let body = String::from_utf8_lossy(truncated).into_owned();
    debug!("Fetched {} ({} bytes)", final_url, bytes.len());

    Ok(PageResponse {
        url: final_url,
        status_code,
        content_length: declared_length
            .map(|l| l as i64)
            .unwrap_or(bytes.len() as i64),
        headers,
        body,
        ..Default::default()
    })
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;
