// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::memory_sink::{FailingSink, MemorySink};
use super::helpers::{start_proxy_server, test_options};
use dispatchrs::domain::models::batch::{Batch, Target};
use dispatchrs::domain::services::correlator::{BatchSummary, Correlator};
use dispatchrs::domain::services::proxy_service::ProxyPool;
use dispatchrs::engines::reqwest_engine::ReqwestCapability;
use dispatchrs::workers::dispatcher::Dispatcher;
use std::sync::Arc;

fn dispatcher(proxy: String) -> Dispatcher {
    Dispatcher::new(
        Arc::new(ReqwestCapability),
        Arc::new(ProxyPool::new(vec![proxy])),
        test_options(),
    )
}

fn mixed_batch() -> Batch {
    Batch::new(
        "summary-1",
        vec![
            Target::new("http://site.invalid/a", "a"),
            Target::new("http://site.invalid/slow", "slow"),
            Target::new("not a url", "broken"),
        ],
    )
}

#[tokio::test]
async fn test_drain_summarises_the_batch() {
    let proxy = start_proxy_server().await;
    let stream = dispatcher(proxy).dispatch(mixed_batch(), 3).await.unwrap();
    assert_eq!(stream.expected(), 3);

    let sink = Arc::new(MemorySink::default());
    let summary = Correlator::new(sink.clone()).drain(stream).await;

    assert_eq!(
        summary,
        BatchSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            sink_errors: 0,
        }
    );
    assert_eq!(
        sink.aliases(),
        vec!["a".to_string(), "broken".to_string(), "slow".to_string()]
    );
}

#[tokio::test]
async fn test_drain_counts_sink_errors_and_keeps_going() {
    let proxy = start_proxy_server().await;
    let stream = dispatcher(proxy).dispatch(mixed_batch(), 1).await.unwrap();

    let summary = Correlator::new(Arc::new(FailingSink)).drain(stream).await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.sink_errors, 3);
}
