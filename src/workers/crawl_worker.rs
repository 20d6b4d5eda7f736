// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{counter, histogram};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use crate::domain::models::batch::Job;
use crate::domain::models::crawl_result::{
    BasicInfo, BodyInfo, CrawlResult, FailureReason, HeadersInfo, ParsedResponse,
};
use crate::engines::traits::{
    CrawlRequest, CrawlSession, EngineError, PageResponse, PageResult, ResultCallback,
};

/// 爬取工作器
///
/// 执行单个任务：把回调式的爬取能力包装成一次等待一个结果的调用。
/// 任何失败都转成 `Failure` 结果，不会影响同池的其他工作器
pub struct CrawlWorker {
    session: Arc<dyn CrawlSession>,
    fetch_timeout: Duration,
}

impl CrawlWorker {
    pub fn new(session: Arc<dyn CrawlSession>, fetch_timeout: Duration) -> Self {
        Self {
            session,
            fetch_timeout,
        }
    }

    /// 使用指定代理执行任务
    #[instrument(skip(self, job, proxy), fields(correlation_id = %job.correlation_id(), alias = %job.alias(), url = %job.url()))]
    pub async fn execute(&self, job: Job, proxy: &str) -> CrawlResult {
        let started = Instant::now();
        let request = CrawlRequest {
            url: job.url().to_string(),
            proxy: proxy.to_string(),
        };

        let result = match self.await_page(request).await {
            Ok(page) => Self::page_to_result(&job, page),
            Err((reason, error)) => {
                warn!("Job failed ({}): {}", reason, error);
                CrawlResult::failure(&job, reason, error)
            }
        };

        histogram!("job_duration_seconds").record(started.elapsed().as_secs_f64());
        match result.failure_reason() {
            None => counter!("jobs_succeeded_total").increment(1),
            Some(reason) => {
                counter!("jobs_failed_total", "reason" => reason.as_str()).increment(1)
            }
        }
        result
    }

    /// 发起爬取并等待回调送达的第一个结果
    async fn await_page(&self, request: CrawlRequest) -> Result<PageResult, (FailureReason, String)> {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Mutex::new(Some(tx)));
        let on_result: ResultCallback = Arc::new(move |page| {
            // Only the first delivery counts.
            if let Some(tx) = slot.lock().take() {
                let _ = tx.send(page);
            }
        });

        let session = self.session.clone();
        let wait = async move {
            session
                .crawl(request, on_result)
                .await
                .map_err(|e| (classify_engine_error(&e), e.to_string()))?;
            rx.await.map_err(|_| {
                (
                    FailureReason::NoResponse,
                    "crawl finished without delivering a result".to_string(),
                )
            })
        };

        match tokio::time::timeout(self.fetch_timeout, wait).await {
            Ok(outcome) => outcome,
            Err(_) => Err((
                FailureReason::Timeout,
                format!("fetch exceeded {:?}", self.fetch_timeout),
            )),
        }
    }

    fn page_to_result(job: &Job, page: PageResult) -> CrawlResult {
        match page.response {
            Some(response) => {
                if let Some(error) = &page.error {
                    debug!("Result carried an error alongside a response: {}", error);
                }
                CrawlResult::success(job, parse_response(&response, job.alias()))
            }
            None => {
                let error = page
                    .error
                    .unwrap_or_else(|| format!("couldn't resolve a response for {}", page.url));
                let reason = if page.timed_out {
                    FailureReason::Timeout
                } else {
                    FailureReason::NoResponse
                };
                CrawlResult::failure(job, reason, error)
            }
        }
    }
}

fn classify_engine_error(err: &EngineError) -> FailureReason {
    match err {
        EngineError::InvalidUrl(_) => FailureReason::InvalidUrl,
        e if e.is_timeout() => FailureReason::Timeout,
        _ => FailureReason::CrawlError,
    }
}

/// 将页面响应转换为分组后的解析结果
///
/// 纯函数，只读取输入
pub fn parse_response(response: &PageResponse, alias: &str) -> ParsedResponse {
    ParsedResponse {
        basic_info: BasicInfo {
            url: response.url.clone(),
            alias: alias.to_string(),
            status_code: response.status_code,
            content_length: response.content_length,
        },
        headers: HeadersInfo {
            entries: response.headers.clone(),
        },
        body: BodyInfo {
            text: response.body.clone(),
        },
        forms: response.forms.clone(),
        xhr_requests: response.xhr_requests.clone(),
        technologies: response.technologies.clone(),
        raw: response.raw.clone(),
        stored_response_path: response.stored_response_path.clone(),
    }
}
