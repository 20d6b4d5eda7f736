// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use metrics::counter;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::domain::models::batch::Batch;
use crate::domain::services::correlator::{BatchSummary, Correlator};
use crate::queue::batch_queue::{Delivery, MessageQueue};
use crate::utils::errors::{IntakeError, WorkerError};
use crate::workers::dispatcher::{Dispatcher, ResultStream};
use crate::workers::worker::Worker;

/// 批次接收工作器
///
/// 从队列接收批次，解码后交给调度器，并把结果流转交给关联器。
/// 同时处理的批次数受 `max_in_flight` 限制，许可在接收下一条消息之前获取
pub struct IntakeWorker<Q: MessageQueue> {
    queue: Arc<Q>,
    dispatcher: Arc<Dispatcher>,
    correlator: Correlator,
    pool_size: i64,
    in_flight: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl<Q: MessageQueue + 'static> IntakeWorker<Q> {
    pub fn new(
        queue: Arc<Q>,
        dispatcher: Arc<Dispatcher>,
        correlator: Correlator,
        pool_size: i64,
        max_in_flight: usize,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            queue,
            dispatcher,
            correlator,
            pool_size,
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
            shutdown,
        }
    }

    /// 运行接收循环
    ///
    /// 只有在队列传输出错、调度出现配置类错误或收到关闭信号时返回；
    /// 返回前等待所有正在输出的批次完成
    pub async fn run_loop(&self) -> Result<(), IntakeError> {
        let mut drains: JoinSet<BatchSummary> = JoinSet::new();
        let outcome = self.intake(&mut drains).await;

        while let Some(joined) = drains.join_next().await {
            if let Err(e) = joined {
                error!("Batch drain task failed: {}", e);
            }
        }
        outcome
    }

    async fn intake(&self, drains: &mut JoinSet<BatchSummary>) -> Result<(), IntakeError> {
        loop {
            let permit = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                permit = self.in_flight.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let delivery = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                delivery = self.queue.receive() => delivery?,
            };

            while let Some(joined) = drains.try_join_next() {
                if let Err(e) = joined {
                    error!("Batch drain task failed: {}", e);
                }
            }

            if let Some(stream) = self.handle_delivery(&delivery).await? {
                let correlator = self.correlator.clone();
                drains.spawn(async move {
                    let _permit = permit;
                    correlator.drain(stream).await
                });
                // The drain owns the stream now, so a failed ack cannot drop results.
                self.queue.ack(&delivery).await?;
            }
        }

        info!("Intake loop stopped");
        Ok(())
    }

    /// 处理一条消息
    ///
    /// 解码失败的消息被丢弃；空批次直接确认。调度成功时返回结果流，
    /// 由调用方交给输出任务后再确认，单个任务失败不会导致重投
    async fn handle_delivery(&self, delivery: &Delivery) -> Result<Option<ResultStream>, IntakeError> {
        counter!("batches_received_total").increment(1);

        let batch = match Batch::decode(&delivery.payload) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Rejecting message {}: {}", delivery.id, e);
                counter!("batches_rejected_total").increment(1);
                self.queue.reject(delivery).await?;
                return Ok(None);
            }
        };

        if batch.is_empty() {
            info!(correlation_id = %batch.correlation_id(), "Batch has no targets, acknowledging");
            self.queue.ack(delivery).await?;
            return Ok(None);
        }

        let correlation_id = batch.correlation_id().to_string();
        match self
            .dispatcher
            .dispatch_with_cancel(batch, self.pool_size, self.shutdown.child_token())
            .await
        {
            Ok(stream) => Ok(Some(stream)),
            Err(e) => {
                error!(correlation_id = %correlation_id, "Dispatch failed: {}", e);
                self.queue.requeue(delivery).await?;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl<Q: MessageQueue + 'static> Worker for IntakeWorker<Q> {
    async fn run(&self) -> Result<(), WorkerError> {
        self.run_loop().await.map_err(WorkerError::from)
    }

    fn name(&self) -> &str {
        "intake"
    }
}
