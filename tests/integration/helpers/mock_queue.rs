// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dispatchrs::queue::batch_queue::{Delivery, MessageQueue, QueueError};
use std::collections::VecDeque;
use std::sync::Mutex;

/// 当队列取空后的行为
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum WhenDrained {
    /// 返回 `QueueError::Closed`，接收循环随之退出
    Close,
    /// 一直等待，直到外部取消
    Block,
    /// 返回传输错误
    Fail,
}

/// 内存消息队列，记录每条消息的最终去向
pub struct MockBatchQueue {
    pending: Mutex<VecDeque<Delivery>>,
    pub acked: Mutex<Vec<Vec<u8>>>,
    pub rejected: Mutex<Vec<Vec<u8>>>,
    pub requeued: Mutex<Vec<Vec<u8>>>,
    when_drained: WhenDrained,
    fail_ack: bool,
}

impl MockBatchQueue {
    pub fn new(when_drained: WhenDrained) -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            acked: Mutex::new(Vec::new()),
            rejected: Mutex::new(Vec::new()),
            requeued: Mutex::new(Vec::new()),
            when_drained,
            fail_ack: false,
        }
    }

    /// 确认时返回传输错误
    pub fn with_failing_ack(mut self) -> Self {
        self.fail_ack = true;
        self
    }

    pub fn with_messages(when_drained: WhenDrained, payloads: Vec<Vec<u8>>) -> Self {
        let queue = Self::new(when_drained);
        {
            let mut pending = queue.pending.lock().unwrap();
            for payload in payloads {
                pending.push_back(Delivery::new(payload));
            }
        }
        queue
    }

    pub fn acked_count(&self) -> usize {
        self.acked.lock().unwrap().len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.lock().unwrap().len()
    }

    pub fn requeued_count(&self) -> usize {
        self.requeued.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageQueue for MockBatchQueue {
    async fn receive(&self) -> Result<Delivery, QueueError> {
        let next = self.pending.lock().unwrap().pop_front();
        match next {
            Some(delivery) => Ok(delivery),
            None => match self.when_drained {
                WhenDrained::Close => Err(QueueError::Closed),
                WhenDrained::Fail => Err(QueueError::Transport("connection reset".to_string())),
                WhenDrained::Block => futures::future::pending().await,
            },
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        if self.fail_ack {
            return Err(QueueError::Transport("ack lost".to_string()));
        }
        self.acked.lock().unwrap().push(delivery.payload.clone());
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.rejected.lock().unwrap().push(delivery.payload.clone());
        Ok(())
    }

    async fn requeue(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.requeued.lock().unwrap().push(delivery.payload.clone());
        Ok(())
    }
}
