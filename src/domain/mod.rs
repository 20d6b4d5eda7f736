// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含调度系统的核心概念：
/// - 领域模型（models）：批次、目标、任务和爬取结果
/// - 仓库接口（repositories）：结果输出的抽象接口
/// - 服务（services）：代理选择和结果关联
///
/// 领域层不依赖任何具体的队列、存储或网络实现。
pub mod models;
pub mod repositories;
pub mod services;
