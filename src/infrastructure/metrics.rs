// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标导出
///
/// 安装失败（例如端口被占用）只记录警告
pub fn init_metrics(listen_addr: &str) {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}", listen_addr, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("batches_received_total", "Total number of batch messages received");
    describe_counter!(
        "batches_rejected_total",
        "Total number of batch messages discarded as undecodable"
    );
    describe_counter!("jobs_dispatched_total", "Total number of jobs fed to worker pools");
    describe_counter!("jobs_succeeded_total", "Total number of jobs with a parsed response");
    describe_counter!("jobs_failed_total", "Total number of jobs recorded as failures");
    describe_counter!("sink_write_errors_total", "Total number of failed result writes");
    describe_histogram!("job_duration_seconds", "Duration of single crawl jobs in seconds");
}
