// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::Rng;
use tracing::{info, warn};

use crate::config::settings::ProxySettings;
use crate::utils::errors::ProxyError;

/// 代理池
///
/// 启动时加载一次，运行期间只读，可被所有工作器并发读取
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
}

impl ProxyPool {
    pub fn new(proxies: Vec<String>) -> Self {
        Self { proxies }
    }

    /// 从配置槽位加载代理
    ///
    /// 槽位按 `{prefix}1..={prefix}{max_slots}` 顺序读取，缺失或为空的槽位只记录警告
    pub fn load(settings: &ProxySettings) -> Self {
        let mut proxies = Vec::with_capacity(settings.max_slots);
        for i in 1..=settings.max_slots {
            let slot = format!("{}{}", settings.slot_prefix, i);
            match settings.slots.get(&slot).map(|p| p.trim()) {
                Some(proxy) if !proxy.is_empty() => proxies.push(proxy.to_string()),
                _ => warn!("No proxy associated with slot {}", slot),
            }
        }

        info!(
            "Loaded {} proxies from {} configured slots",
            proxies.len(),
            settings.max_slots
        );
        Self { proxies }
    }

    /// 均匀随机选择一个代理
    ///
    /// 代理池为空时返回 `NoProxyAvailable`，调用方不得在无代理的情况下继续爬取
    pub fn pick_one(&self) -> Result<&str, ProxyError> {
        if self.proxies.is_empty() {
            return Err(ProxyError::NoProxyAvailable);
        }
        let idx = rand::rng().random_range(0..self.proxies.len());
        Ok(&self.proxies[idx])
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }
}
