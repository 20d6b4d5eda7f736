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

use anyhow::{bail, Context};
use dispatchrs::config::settings::Settings;
use dispatchrs::domain::repositories::result_sink::ResultSink;
use dispatchrs::domain::services::correlator::Correlator;
use dispatchrs::domain::services::proxy_service::ProxyPool;
use dispatchrs::engines::reqwest_engine::ReqwestCapability;
use dispatchrs::engines::traits::{CrawlCapability, CrawlOptions};
use dispatchrs::infrastructure::cache::redis_client::RedisClient;
use dispatchrs::infrastructure::sinks::{FileResultSink, QueueResultSink};
use dispatchrs::queue::redis_queue::RedisBatchQueue;
use dispatchrs::utils::telemetry;
use dispatchrs::workers::dispatcher::Dispatcher;
use dispatchrs::workers::intake_worker::IntakeWorker;
use dispatchrs::workers::manager::WorkerManager;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use validator::Validate;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动接收循环
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting dispatchrs...");

    // 2. Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;
    info!("Configuration loaded");

    if settings.metrics.enabled {
        dispatchrs::infrastructure::metrics::init_metrics(&settings.metrics.listen_addr);
    }

    // 3. Load proxies
    let proxies = Arc::new(ProxyPool::load(&settings.proxies));
    if proxies.is_empty() {
        bail!("no proxies configured; refusing to crawl without a proxy");
    }

    // 4. Initialize Redis Client
    let redis_client = RedisClient::new(&settings.queue.url).await?;
    info!("Redis client initialized");

    // 5. Initialize Components
    let queue = Arc::new(RedisBatchQueue::new(redis_client.clone(), &settings.queue));
    let recovered = queue
        .recover()
        .await
        .with_context(|| format!("failed to recover {}", queue.processing_queue()))?;
    info!("{} messages returned to {}", recovered, settings.queue.batch_queue);

    let sink: Arc<dyn ResultSink> = match settings.sink.sink_type.as_str() {
        "file" => Arc::new(FileResultSink::new(&settings.sink.output_dir)),
        "queue" => Arc::new(QueueResultSink::new(
            redis_client.clone(),
            &settings.sink.result_queue,
        )),
        other => bail!("unknown sink type: {}", other),
    };
    let correlator = Correlator::new(sink);

    let capability: Arc<dyn CrawlCapability> = match settings.crawl.engine.as_str() {
        "reqwest" => Arc::new(ReqwestCapability),
        other => bail!("unknown crawl engine: {}", other),
    };
    info!("Using crawl engine {}", capability.name());
    let dispatcher = Arc::new(Dispatcher::new(
        capability,
        proxies,
        CrawlOptions::from(&settings.crawl),
    ));

    // 6. Start Workers
    let mut worker_manager = WorkerManager::new(CancellationToken::new());
    let intake = IntakeWorker::new(
        queue,
        dispatcher,
        correlator,
        settings.dispatch.pool_size,
        settings.dispatch.max_in_flight_batches,
        worker_manager.shutdown_token(),
    );
    worker_manager.start_worker(Arc::new(intake));
    info!(
        "Listening on queue {} with pool size {}",
        settings.queue.batch_queue, settings.dispatch.pool_size
    );

    worker_manager.wait_for_shutdown().await?;
    Ok(())
}
