// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 批次（batch）：不可变的目标批次及调度任务
/// - 爬取结果（crawl_result）：带别名和关联ID的结果
pub mod batch;
pub mod crawl_result;
