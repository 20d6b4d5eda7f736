// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 代理服务（proxy_service）：加载代理池并随机选择代理
/// - 结果关联器（correlator）：把完成的结果交给输出端
pub mod correlator;
pub mod proxy_service;
