// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供批次调度和后台工作器管理功能
/// 包括单任务执行、固定大小工作池、批次接收循环和生命周期管理
pub mod crawl_worker;
pub mod dispatcher;
pub mod intake_worker;
pub mod manager;
pub mod worker;

pub use worker::Worker;
