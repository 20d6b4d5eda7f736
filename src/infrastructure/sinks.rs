// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::domain::models::crawl_result::CrawlResult;
use crate::domain::repositories::result_sink::{ResultSink, SinkError};
use crate::infrastructure::cache::redis_client::RedisClient;

/// 本地文件输出
///
/// 每个结果写为 `{base}/{correlation_id}/{alias}.json`（格式化 JSON）。
/// 同一批次中重复的别名依次加 `-1`、`-2` 后缀，不会互相覆盖
pub struct FileResultSink {
    base_path: PathBuf,
}

impl FileResultSink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn batch_dir(&self, correlation_id: &str) -> PathBuf {
        self.base_path.join(sanitize_component(correlation_id))
    }

    /// 以独占方式创建文件，别名冲突时递增后缀
    async fn create_unique(dir: &Path, alias: &str) -> Result<(fs::File, PathBuf), SinkError> {
        let stem = sanitize_component(alias);
        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                format!("{}.json", stem)
            } else {
                format!("{}-{}.json", stem, attempt)
            };
            let path = dir.join(name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((file, path)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ResultSink for FileResultSink {
    async fn accept(&self, result: &CrawlResult) -> Result<(), SinkError> {
        let data = serde_json::to_vec_pretty(result)?;

        // 确保目录存在
        let dir = self.batch_dir(&result.correlation_id);
        fs::create_dir_all(&dir).await?;

        let (mut file, path) = Self::create_unique(&dir, &result.alias).await?;
        file.write_all(&data).await?;
        file.flush().await?;

        debug!("Saved result to {}", path.display());
        Ok(())
    }
}

/// 把别名或关联ID转换为安全的文件名片段
fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned.to_string()
    }
}

/// 队列输出
///
/// 把结果 JSON 追加到 Redis 结果列表，交给下游消费
pub struct QueueResultSink {
    client: RedisClient,
    queue: String,
}

impl QueueResultSink {
    pub fn new(client: RedisClient, queue: impl Into<String>) -> Self {
        Self {
            client,
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl ResultSink for QueueResultSink {
    async fn accept(&self, result: &CrawlResult) -> Result<(), SinkError> {
        let data = serde_json::to_vec(result)?;
        self.client
            .push_back(&self.queue, &data)
            .await
            .map_err(|e| SinkError::Publish(e.to_string()))
    }
}
