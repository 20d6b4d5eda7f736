// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 定义批次消息队列接口及其 Redis 实现
pub mod batch_queue;
pub mod redis_queue;
