// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::DecodeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// 爬取目标
///
/// 一个 (url, alias) 对。alias 仅用于输出路由，不参与爬取逻辑，
/// 同一批次内允许重复
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    url: String,
    alias: String,
}

impl Target {
    pub fn new(url: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alias: alias.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }
}

/// 目标批次
///
/// 由一条队列消息完整解码而来，创建后不可变。
/// 关联ID由调用方提供，系统从不自行生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    targets: Vec<Target>,
    #[serde(rename = "id")]
    correlation_id: String,
}

impl Batch {
    pub fn new(correlation_id: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            targets,
            correlation_id: correlation_id.into(),
        }
    }

    /// 从队列载荷解码批次
    ///
    /// 载荷格式: `{"targets":[{"url":"...","alias":"..."}],"id":"..."}`
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// 编码为队列载荷
    pub fn encode(&self) -> Vec<u8> {
        // Plain strings only; serialization cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// 按批次顺序返回所有URL
    pub fn urls(&self) -> Vec<&str> {
        self.targets.iter().map(Target::url).collect()
    }

    /// 返回URL对应的第一个别名
    pub fn alias_for(&self, url: &str) -> Option<&str> {
        self.targets
            .iter()
            .find(|t| t.url == url)
            .map(Target::alias)
    }

    /// 为给定URL构建 URL -> 别名 映射
    ///
    /// 批次中不存在的URL会被忽略；重复URL取第一个别名
    pub fn alias_map<'a>(&'a self, urls: &[&str]) -> HashMap<String, &'a str> {
        let mut lookup: HashMap<&str, &str> = HashMap::with_capacity(self.targets.len());
        for target in &self.targets {
            lookup.entry(target.url()).or_insert(target.alias());
        }

        urls.iter()
            .filter_map(|url| lookup.get(url).map(|alias| (url.to_string(), *alias)))
            .collect()
    }

    /// 拆分为任务，按批次顺序编号
    pub fn into_jobs(self) -> Vec<Job> {
        let correlation_id: Arc<str> = Arc::from(self.correlation_id);
        self.targets
            .into_iter()
            .enumerate()
            .map(|(index, target)| Job {
                index,
                target,
                correlation_id: correlation_id.clone(),
            })
            .collect()
    }
}

/// 调度任务
///
/// 一个目标加上所属批次的关联ID，只会被一个工作器消费一次
#[derive(Debug, Clone)]
pub struct Job {
    index: usize,
    target: Target,
    correlation_id: Arc<str>,
}

impl Job {
    /// 在批次中的提交序号
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn url(&self) -> &str {
        self.target.url()
    }

    pub fn alias(&self) -> &str {
        self.target.alias()
    }

    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
