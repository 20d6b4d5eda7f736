// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::settings::QueueSettings;
use crate::infrastructure::cache::redis_client::RedisClient;
use crate::queue::batch_queue::{Delivery, MessageQueue, QueueError};

/// Redis 批次队列
///
/// 可靠列表模式：接收时把消息移入处理中列表，确认或拒绝时再从处理中列表移除
pub struct RedisBatchQueue {
    client: RedisClient,
    queue: String,
    processing: String,
    poll_interval: Duration,
}

impl RedisBatchQueue {
    pub fn new(client: RedisClient, settings: &QueueSettings) -> Self {
        Self {
            client,
            queue: settings.batch_queue.clone(),
            processing: settings.processing_queue.clone(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms),
        }
    }

    /// 处理中列表名
    pub fn processing_queue(&self) -> &str {
        &self.processing
    }

    /// 把上次运行遗留在处理中列表的消息放回批次队列头部
    ///
    /// 只应在开始接收之前调用；假定处理中列表只属于当前消费者
    pub async fn recover(&self) -> Result<usize, QueueError> {
        let stranded = self.client.len(&self.processing).await.map_err(transport)?;
        let mut recovered = 0;
        for _ in 0..stranded {
            match self
                .client
                .move_tail_to_head(&self.processing, &self.queue)
                .await
                .map_err(transport)?
            {
                Some(_) => recovered += 1,
                None => break,
            }
        }
        if recovered > 0 {
            info!(
                "Recovered {} unacknowledged messages from {} into {}",
                recovered, self.processing, self.queue
            );
        }
        Ok(recovered)
    }
}

fn transport(e: anyhow::Error) -> QueueError {
    QueueError::Transport(e.to_string())
}

#[async_trait]
impl MessageQueue for RedisBatchQueue {
    async fn receive(&self) -> Result<Delivery, QueueError> {
        loop {
            match self
                .client
                .move_head(&self.queue, &self.processing)
                .await
                .map_err(transport)?
            {
                Some(payload) => {
                    debug!("Received message from {} ({} bytes)", self.queue, payload.len());
                    return Ok(Delivery::new(payload));
                }
                None => sleep(self.poll_interval).await,
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        let removed = self
            .client
            .remove_one(&self.processing, &delivery.payload)
            .await
            .map_err(transport)?;
        if removed == 0 {
            warn!("Acked message {} was not in {}", delivery.id, self.processing);
        }
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.client
            .remove_one(&self.processing, &delivery.payload)
            .await
            .map_err(transport)?;
        warn!("Discarded message {} from {}", delivery.id, self.queue);
        Ok(())
    }

    async fn requeue(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.client
            .move_back(&self.processing, &self.queue, &delivery.payload)
            .await
            .map_err(transport)
    }
}
