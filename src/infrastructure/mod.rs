// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含与外部系统交互的具体实现：
/// - 缓存（cache）：Redis客户端
/// - 指标（metrics）：Prometheus 指标导出
/// - 输出（sinks）：文件和队列结果输出
pub mod cache;
pub mod metrics;
pub mod sinks;
