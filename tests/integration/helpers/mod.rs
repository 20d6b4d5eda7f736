// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod mock_queue;
pub mod memory_sink;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use dispatchrs::domain::repositories::result_sink::ResultSink;
use dispatchrs::domain::services::correlator::Correlator;
use dispatchrs::domain::services::proxy_service::ProxyPool;
use dispatchrs::engines::reqwest_engine::ReqwestCapability;
use dispatchrs::engines::traits::CrawlOptions;
use dispatchrs::workers::dispatcher::Dispatcher;
use dispatchrs::workers::intake_worker::IntakeWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use self::mock_queue::MockBatchQueue;

/// 启动测试代理
///
/// 代理请求带绝对 URI，axum 只按路径路由，所以同一个服务器既是代理也是目标站点
pub async fn start_proxy_server() -> String {
    let app = Router::new()
        .route(
            "/a",
            get(|| async {
                Response::builder()
                    .header("content-type", "text/html")
                    .body("<html><body>page a</body></html>".to_string())
                    .unwrap()
            }),
        )
        .route("/b", get(|| async { "page b" }))
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                "slow page"
            }),
        )
        .route(
            "/missing",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn test_options() -> CrawlOptions {
    CrawlOptions {
        timeout: Duration::from_secs(5),
        ..CrawlOptions::default()
    }
}

/// 组装一个接收工作器，爬取走真实的 reqwest 引擎
pub fn build_intake(
    queue: Arc<MockBatchQueue>,
    proxies: Vec<String>,
    sink: Arc<dyn ResultSink>,
    pool_size: i64,
    shutdown: CancellationToken,
) -> IntakeWorker<MockBatchQueue> {
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(ReqwestCapability),
        Arc::new(ProxyPool::new(proxies)),
        test_options(),
    ));
    IntakeWorker::new(
        queue,
        dispatcher,
        Correlator::new(sink),
        pool_size,
        1,
        shutdown,
    )
}
