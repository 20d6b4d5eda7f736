// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use dispatchrs::domain::models::crawl_result::CrawlResult;
use dispatchrs::domain::repositories::result_sink::{ResultSink, SinkError};
use std::sync::Mutex;

/// 把结果收集在内存里的输出端
#[derive(Default)]
pub struct MemorySink {
    pub results: Mutex<Vec<CrawlResult>>,
}

impl MemorySink {
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .results
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.alias.clone())
            .collect();
        aliases.sort();
        aliases
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap().len()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn accept(&self, result: &CrawlResult) -> Result<(), SinkError> {
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }
}

/// 每次写出都失败的输出端
pub struct FailingSink;

#[async_trait]
impl ResultSink for FailingSink {
    async fn accept(&self, _result: &CrawlResult) -> Result<(), SinkError> {
        Err(SinkError::Publish("result broker unavailable".to_string()))
    }
}
