// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub use crate::utils::errors::QueueError;

/// 一条待确认的队列消息
#[derive(Debug, Clone)]
pub struct Delivery {
    /// 投递标识
    pub id: Uuid,
    /// 原始载荷
    pub payload: Vec<u8>,
}

impl Delivery {
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
        }
    }
}

/// 批次消息队列特质
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// 阻塞等待下一条消息
    async fn receive(&self) -> Result<Delivery, QueueError>;

    /// 确认消息，从队列中移除
    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 拒绝消息并丢弃，不再投递
    async fn reject(&self, delivery: &Delivery) -> Result<(), QueueError>;

    /// 把消息放回队列等待重新投递
    async fn requeue(&self, delivery: &Delivery) -> Result<(), QueueError>;
}

#[async_trait]
impl<T: MessageQueue + ?Sized> MessageQueue for Arc<T> {
    async fn receive(&self) -> Result<Delivery, QueueError> {
        (**self).receive().await
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        (**self).ack(delivery).await
    }

    async fn reject(&self, delivery: &Delivery) -> Result<(), QueueError> {
        (**self).reject(delivery).await
    }

    async fn requeue(&self, delivery: &Delivery) -> Result<(), QueueError> {
        (**self).requeue(delivery).await
    }
}
