// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::counter;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::domain::models::crawl_result::CrawlResult;
use crate::domain::repositories::result_sink::ResultSink;
use crate::workers::dispatcher::ResultStream;

/// 单个批次的输出汇总
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub sink_errors: usize,
}

/// 结果关联器
///
/// 按到达顺序接收结果并交给输出端。写出失败只记录，不回传给工作池
#[derive(Clone)]
pub struct Correlator {
    sink: Arc<dyn ResultSink>,
}

impl Correlator {
    pub fn new(sink: Arc<dyn ResultSink>) -> Self {
        Self { sink }
    }

    /// 接收一个结果
    ///
    /// 返回是否写出成功
    pub async fn accept(&self, result: CrawlResult) -> bool {
        match self.sink.accept(&result).await {
            Ok(()) => true,
            Err(e) => {
                counter!("sink_write_errors_total").increment(1);
                warn!(
                    correlation_id = %result.correlation_id,
                    alias = %result.alias,
                    "Failed to write result: {}",
                    e
                );
                false
            }
        }
    }

    /// 消费整个结果流
    #[instrument(skip(self, stream), fields(correlation_id = %stream.correlation_id()))]
    pub async fn drain(&self, mut stream: ResultStream) -> BatchSummary {
        let mut summary = BatchSummary::default();
        while let Some(result) = stream.next_result().await {
            summary.total += 1;
            if result.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            if !self.accept(result).await {
                summary.sink_errors += 1;
            }
        }

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            sink_errors = summary.sink_errors,
            "Batch drained"
        );
        summary
    }
}
