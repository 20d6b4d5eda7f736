// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::models::crawl_result::CrawlResult;
pub use crate::utils::errors::SinkError;

/// 结果输出特质
///
/// 按别名（以及支持时按关联ID）写出结果
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// 写出一个结果
    async fn accept(&self, result: &CrawlResult) -> Result<(), SinkError>;
}

#[async_trait]
impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    async fn accept(&self, result: &CrawlResult) -> Result<(), SinkError> {
        (**self).accept(result).await
    }
}
