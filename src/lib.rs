// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含核心业务实体、服务和仓库接口
pub mod domain;

/// 引擎模块
///
/// 定义爬取能力接口及其实现
pub mod engines;

/// 基础设施模块
///
/// 提供外部服务集成，如Redis、文件输出、指标等
pub mod infrastructure;

/// 队列模块
///
/// 实现批次消息队列
pub mod queue;

/// 工具模块
///
/// 提供通用的工具函数和辅助功能
pub mod utils;

/// 工作器模块
///
/// 实现批次调度、工作池和接收循环
pub mod workers;
