// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 批次载荷解码错误
///
/// 消息结构不可解析，直接丢弃，不做重试
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("批次载荷格式错误: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 代理选择错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("代理池为空，没有可用代理")]
    NoProxyAvailable,
}

/// 调度错误类型
///
/// 只有配置类错误会中止整个调度，单个任务的失败记录在结果中
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("无效的并发数: {0}")]
    InvalidConcurrency(i64),

    #[error("没有可用代理")]
    NoProxyAvailable,

    #[error("爬取会话初始化失败: {0}")]
    SessionInit(String),
}

impl From<ProxyError> for DispatchError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::NoProxyAvailable => DispatchError::NoProxyAvailable,
        }
    }
}

/// 输出写入错误
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Publish error: {0}")]
    Publish(String),
}

/// 队列传输错误
#[derive(Error, Debug)]
pub enum QueueError {
    #[error("队列传输错误: {0}")]
    Transport(String),

    #[error("队列订阅已关闭")]
    Closed,
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::Transport(err.to_string())
    }
}

/// 批次接收循环的致命错误
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("队列错误: {0}")]
    Queue(#[from] QueueError),

    #[error("调度错误: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Worker错误类型
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("接收循环错误: {0}")]
    Intake(#[from] IntakeError),
}
