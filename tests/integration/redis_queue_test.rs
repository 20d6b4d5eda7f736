// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 需要真实 Redis：设置 `DISPATCH_TEST_REDIS_URL`（如 `redis://127.0.0.1:6379`）后运行，
//! 未设置时这些测试直接跳过

use dispatchrs::config::settings::QueueSettings;
use dispatchrs::infrastructure::cache::redis_client::RedisClient;
use dispatchrs::queue::batch_queue::MessageQueue;
use dispatchrs::queue::redis_queue::RedisBatchQueue;
use uuid::Uuid;

struct Lists {
    client: RedisClient,
    settings: QueueSettings,
}

impl Lists {
    fn queue(&self) -> RedisBatchQueue {
        RedisBatchQueue::new(self.client.clone(), &self.settings)
    }

    async fn pending(&self) -> usize {
        self.client.len(&self.settings.batch_queue).await.unwrap()
    }

    async fn processing(&self) -> usize {
        self.client.len(&self.settings.processing_queue).await.unwrap()
    }

    async fn push(&self, payload: &[u8]) {
        self.client
            .push_back(&self.settings.batch_queue, payload)
            .await
            .unwrap();
    }
}

/// 每个测试使用独立的列表名
async fn lists() -> Option<Lists> {
    let url = match std::env::var("DISPATCH_TEST_REDIS_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DISPATCH_TEST_REDIS_URL not set, skipping Redis queue test");
            return None;
        }
    };
    let client = RedisClient::new(&url).await.expect("invalid redis url");

    // Wait for the server to accept connections
    let mut ready = false;
    for _ in 0..20 {
        if client.len("dispatchrs:readiness").await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(250)).await;
    }
    assert!(ready, "redis at {} is not reachable", url);

    let prefix = format!("dispatchrs-test-{}", Uuid::new_v4());
    Some(Lists {
        client,
        settings: QueueSettings {
            url,
            batch_queue: format!("{}.batches", prefix),
            processing_queue: format!("{}.processing", prefix),
            poll_interval_ms: 20,
        },
    })
}

#[tokio::test]
async fn test_ack_removes_message_from_processing() {
    let Some(lists) = lists().await else { return };
    let queue = lists.queue();
    lists.push(b"batch-1").await;

    let delivery = queue.receive().await.unwrap();
    assert_eq!(delivery.payload, b"batch-1");
    assert_eq!(lists.pending().await, 0);
    assert_eq!(lists.processing().await, 1);

    queue.ack(&delivery).await.unwrap();
    assert_eq!(lists.processing().await, 0);
    assert_eq!(lists.pending().await, 0);
}

#[tokio::test]
async fn test_reject_discards_message() {
    let Some(lists) = lists().await else { return };
    let queue = lists.queue();
    lists.push(b"{not json").await;

    let delivery = queue.receive().await.unwrap();
    queue.reject(&delivery).await.unwrap();

    assert_eq!(lists.processing().await, 0);
    assert_eq!(lists.pending().await, 0);
}

#[tokio::test]
async fn test_requeue_returns_message_to_the_head() {
    let Some(lists) = lists().await else { return };
    let queue = lists.queue();
    lists.push(b"first").await;
    lists.push(b"second").await;

    let first = queue.receive().await.unwrap();
    queue.requeue(&first).await.unwrap();
    assert_eq!(lists.processing().await, 0);
    assert_eq!(lists.pending().await, 2);

    let again = queue.receive().await.unwrap();
    assert_eq!(again.payload, b"first");
}

#[tokio::test]
async fn test_recover_restores_stranded_messages_in_order() {
    let Some(lists) = lists().await else { return };
    lists.push(b"first").await;
    lists.push(b"second").await;
    lists.push(b"third").await;

    // A previous run took two messages and died before acking them.
    let crashed = lists.queue();
    crashed.receive().await.unwrap();
    crashed.receive().await.unwrap();
    assert_eq!(lists.processing().await, 2);

    let queue = lists.queue();
    assert_eq!(queue.recover().await.unwrap(), 2);
    assert_eq!(lists.processing().await, 0);
    assert_eq!(lists.pending().await, 3);

    for expected in [&b"first"[..], b"second", b"third"] {
        let delivery = queue.receive().await.unwrap();
        assert_eq!(delivery.payload, expected);
        queue.ack(&delivery).await.unwrap();
    }
    assert_eq!(queue.recover().await.unwrap(), 0);
}
