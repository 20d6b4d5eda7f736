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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

/// 应用程序配置设置
///
/// 进程启动时构建一次，按子结构传入各组件
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Settings {
    /// 调度配置
    #[validate(nested)]
    pub dispatch: DispatchSettings,
    /// 爬取配置
    #[validate(nested)]
    pub crawl: CrawlSettings,
    /// 代理配置
    pub proxies: ProxySettings,
    /// 队列配置
    pub queue: QueueSettings,
    /// 结果输出配置
    pub sink: SinkSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 调度配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DispatchSettings {
    /// 每个批次的工作器数量，调度时校验
    pub pool_size: i64,
    /// 同时处理的批次数上限，1 表示严格顺序处理
    #[validate(range(min = 1))]
    pub max_in_flight_batches: usize,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CrawlSettings {
    /// 单次抓取超时时间（秒）
    #[validate(range(min = 1, max = 3600))]
    pub timeout_secs: u64,
    /// 会话内并行抓取上限
    #[validate(range(min = 1))]
    pub parallelism: usize,
    /// 每秒请求数上限
    #[validate(range(min = 1))]
    pub rate_limit: u32,
    /// 爬取深度
    pub max_depth: u32,
    /// 爬取策略 (depth-first, breadth-first)
    pub strategy: String,
    /// 响应体最大读取字节数
    pub body_read_size: usize,
    /// 是否无头模式
    pub headless: bool,
    /// 是否检测技术栈
    pub tech_detect: bool,
    /// 是否提取 XHR 请求
    pub xhr_extraction: bool,
    /// 引擎名称
    pub engine: String,
}

impl CrawlSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 代理配置设置
///
/// 代理槽位按 `{slot_prefix}1` 到 `{slot_prefix}{max_slots}` 的顺序读取
#[derive(Debug, Clone, Deserialize)]
pub struct ProxySettings {
    /// 槽位名前缀
    pub slot_prefix: String,
    /// 槽位数量
    pub max_slots: usize,
    /// 槽位名到代理 URL 的映射
    #[serde(default)]
    pub slots: HashMap<String, String>,
}

/// 队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// Redis连接URL
    pub url: String,
    /// 批次入队列名
    pub batch_queue: String,
    /// 处理中列表名
    pub processing_queue: String,
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
}

/// 结果输出配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SinkSettings {
    /// 输出类型 (file, queue)
    pub sink_type: String,
    /// 文件输出目录 (当 type=file 时使用)
    pub output_dir: String,
    /// 结果队列名 (当 type=queue 时使用)
    pub result_queue: String,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// 导出监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、配置文件和 `DISPATCH__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("DISPATCH").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅使用内置默认值构建配置
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder())?.build()?.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Dispatch
            .set_default("dispatch.pool_size", 4)?
            .set_default("dispatch.max_in_flight_batches", 1)?
            // Crawl
            .set_default("crawl.timeout_secs", 10)?
            .set_default("crawl.parallelism", 10)?
            .set_default("crawl.rate_limit", 150)?
            .set_default("crawl.max_depth", 0)?
            .set_default("crawl.strategy", "depth-first")?
            .set_default("crawl.body_read_size", 16 * 1024 * 1024)?
            .set_default("crawl.headless", true)?
            .set_default("crawl.tech_detect", true)?
            .set_default("crawl.xhr_extraction", true)?
            .set_default("crawl.engine", "reqwest")?
            // Proxies
            .set_default("proxies.slot_prefix", "prox")?
            .set_default("proxies.max_slots", 0)?
            // Queue
            .set_default("queue.url", "redis://127.0.0.1:6379")?
            .set_default("queue.batch_queue", "GoGet")?
            .set_default("queue.processing_queue", "GoGet.processing")?
            .set_default("queue.poll_interval_ms", 1000)?
            // Sink
            .set_default("sink.sink_type", "file")?
            .set_default("sink.output_dir", "RequestPipe/Returned")?
            .set_default("sink.result_queue", "GoGet.results")?
            // Metrics
            .set_default("metrics.enabled", false)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
