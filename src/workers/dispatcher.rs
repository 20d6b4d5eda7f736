// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use futures::Stream;
use metrics::counter;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::domain::models::batch::{Batch, Job};
use crate::domain::models::crawl_result::{CrawlResult, FailureReason};
use crate::domain::services::proxy_service::ProxyPool;
use crate::engines::traits::{CrawlCapability, CrawlOptions};
use crate::utils::errors::DispatchError;
use crate::workers::crawl_worker::CrawlWorker;

/// 批次调度器
///
/// 每次调度为一个批次创建固定大小的工作池：多个工作器消费同一个任务通道，
/// 结果汇入同一个结果通道（扇出/扇入）
pub struct Dispatcher {
    capability: Arc<dyn CrawlCapability>,
    proxies: Arc<ProxyPool>,
    options: CrawlOptions,
}

impl Dispatcher {
    pub fn new(
        capability: Arc<dyn CrawlCapability>,
        proxies: Arc<ProxyPool>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            capability,
            proxies,
            options,
        }
    }

    /// 调度一个批次
    ///
    /// 返回的结果流按完成顺序产出，产出数量等于批次目标数
    pub async fn dispatch(&self, batch: Batch, pool_size: i64) -> Result<ResultStream, DispatchError> {
        self.dispatch_with_cancel(batch, pool_size, CancellationToken::new())
            .await
    }

    /// 调度一个批次，支持取消
    ///
    /// 取消后，尚未开始的任务以 `cancelled` 失败结果产出
    #[instrument(skip(self, batch, cancel), fields(correlation_id = %batch.correlation_id(), targets = batch.len()))]
    pub async fn dispatch_with_cancel(
        &self,
        batch: Batch,
        pool_size: i64,
        cancel: CancellationToken,
    ) -> Result<ResultStream, DispatchError> {
        if pool_size < 1 {
            return Err(DispatchError::InvalidConcurrency(pool_size));
        }
        if self.proxies.is_empty() {
            return Err(DispatchError::NoProxyAvailable);
        }

        let session = self
            .capability
            .new_session(self.options.clone())
            .await
            .map_err(|e| DispatchError::SessionInit(e.to_string()))?;
        let worker = Arc::new(CrawlWorker::new(session, self.options.timeout));

        let correlation_id = batch.correlation_id().to_string();
        let expected = batch.len();
        let capacity = expected.max(1);

        let (job_tx, job_rx) = mpsc::channel::<Job>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<CrawlResult>(capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        // Workers beyond the job count would only see a closed channel.
        let workers = usize::try_from(pool_size)
            .unwrap_or(usize::MAX)
            .min(expected);
        let mut handles = Vec::with_capacity(workers);
        for worker_index in 0..workers {
            handles.push(tokio::spawn(worker_loop(
                worker_index,
                worker.clone(),
                self.proxies.clone(),
                job_rx.clone(),
                result_tx.clone(),
                cancel.clone(),
            )));
        }
        // Workers hold the only result senders from here on.
        drop(result_tx);

        debug!("Feeding targets: {:?}", batch.urls());
        let mut fed = 0;
        for job in batch.into_jobs() {
            if cancel.is_cancelled() {
                debug!("Dispatch cancelled, {} jobs left unfed", expected - fed);
                break;
            }
            // Capacity equals batch size, so this never waits.
            if job_tx.send(job).await.is_err() {
                error!("All workers exited before the batch was fed");
                break;
            }
            fed += 1;
        }
        drop(job_tx);
        counter!("jobs_dispatched_total").increment(fed as u64);

        let supervisor = tokio::spawn(supervise(correlation_id.clone(), handles));
        info!("Dispatched {} jobs across {} workers", fed, workers);

        Ok(ResultStream {
            correlation_id,
            expected: fed,
            results: result_rx,
            supervisor: Some(supervisor),
        })
    }
}

/// 工作器循环：不断取任务直到任务通道关闭
async fn worker_loop(
    worker_index: usize,
    worker: Arc<CrawlWorker>,
    proxies: Arc<ProxyPool>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<CrawlResult>,
    cancel: CancellationToken,
) {
    loop {
        let job = {
            let mut rx = jobs.lock().await;
            rx.recv().await
        };
        let Some(job) = job else {
            break;
        };

        let result = if cancel.is_cancelled() {
            CrawlResult::failure(&job, FailureReason::Cancelled, "dispatch cancelled")
        } else {
            match proxies.pick_one() {
                Ok(proxy) => worker.execute(job, proxy).await,
                Err(e) => CrawlResult::failure(&job, FailureReason::CrawlError, e.to_string()),
            }
        };

        if results.send(result).await.is_err() {
            debug!("Worker {} result receiver dropped, exiting", worker_index);
            break;
        }
    }
    debug!("Worker {} exited", worker_index);
}

/// 等待所有工作器退出；之后结果通道随最后一个发送端关闭
async fn supervise(correlation_id: String, handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            error!(correlation_id = %correlation_id, "Worker terminated abnormally: {}", e);
        }
    }
    debug!(correlation_id = %correlation_id, "All workers finished");
}

/// 单次调度的结果流
///
/// 有限且不可重启；所有工作器退出后结束
pub struct ResultStream {
    correlation_id: String,
    expected: usize,
    results: mpsc::Receiver<CrawlResult>,
    supervisor: Option<JoinHandle<()>>,
}

impl ResultStream {
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    /// 已送入任务通道的任务数，即应产出的结果数量
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// 取下一个完成的结果，流结束时返回 None
    pub async fn next_result(&mut self) -> Option<CrawlResult> {
        let next = self.results.recv().await;
        if next.is_none() {
            if let Some(supervisor) = self.supervisor.take() {
                let _ = supervisor.await;
            }
        }
        next
    }

    /// 收集剩余全部结果
    pub async fn collect_all(mut self) -> Vec<CrawlResult> {
        let mut collected = Vec::with_capacity(self.expected);
        while let Some(result) = self.next_result().await {
            collected.push(result);
        }
        collected
    }
}

impl Stream for ResultStream {
    type Item = CrawlResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.results.poll_recv(cx)
    }
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
