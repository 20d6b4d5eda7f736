// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use redis::AsyncCommands;

/// Redis客户端
///
/// 提供批次队列和结果队列所需的列表操作
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(anyhow::Error)` - URL 无效
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 将 `source` 头部元素原子地移动到 `destination` 尾部
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(payload))` - 被移动的元素
    /// * `Ok(None)` - 源列表为空
    pub async fn move_head(&self, source: &str, destination: &str) -> Result<Option<Vec<u8>>> {
        self.lmove(source, destination, "LEFT", "RIGHT").await
    }

    /// 将 `source` 尾部元素原子地移动到 `destination` 头部
    ///
    /// 反复调用可以把整个列表按原顺序放回另一个列表的前端
    pub async fn move_tail_to_head(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Option<Vec<u8>>> {
        self.lmove(source, destination, "RIGHT", "LEFT").await
    }

    async fn lmove(
        &self,
        source: &str,
        destination: &str,
        from: &str,
        to: &str,
    ) -> Result<Option<Vec<u8>>> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let value: Option<Vec<u8>> = redis::cmd("LMOVE")
            .arg(source)
            .arg(destination)
            .arg(from)
            .arg(to)
            .query_async(&mut con)
            .await?;
        Ok(value)
    }

    /// 从列表中移除一个与 `payload` 相同的元素
    ///
    /// # 返回值
    ///
    /// * `Ok(n)` - 实际移除的数量
    pub async fn remove_one(&self, key: &str, payload: &[u8]) -> Result<i64> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let removed: i64 = con.lrem(key, 1, payload).await?;
        Ok(removed)
    }

    /// 追加元素到列表尾部
    pub async fn push_back(&self, key: &str, payload: &[u8]) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        con.rpush::<_, _, ()>(key, payload).await?;
        Ok(())
    }

    /// 原子地把元素从 `from` 移回 `to` 的头部
    pub async fn move_back(&self, from: &str, to: &str, payload: &[u8]) -> Result<()> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let _: () = move_back_pipeline(from, to, payload)
            .query_async(&mut con)
            .await?;
        Ok(())
    }

    /// 列表长度
    pub async fn len(&self, key: &str) -> Result<usize> {
        let mut con = self.client.get_multiplexed_async_connection().await?;
        let len: usize = con.llen(key).await?;
        Ok(len)
    }
}

/// LREM 与 LPUSH 放在同一个 MULTI/EXEC 事务中
fn move_back_pipeline(from: &str, to: &str, payload: &[u8]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("LREM")
        .arg(from)
        .arg(1)
        .arg(payload)
        .ignore()
        .cmd("LPUSH")
        .arg(to)
        .arg(payload)
        .ignore();
    pipe
}
