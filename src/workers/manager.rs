// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::utils::errors::WorkerError;
use crate::workers::worker::Worker;

/// 工作管理器
///
/// 启动后台工作器，并在收到关闭信号时通过取消令牌让它们有序退出
pub struct WorkerManager {
    shutdown: CancellationToken,
    handles: Vec<(String, JoinHandle<Result<(), WorkerError>>)>,
}

impl WorkerManager {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            handles: Vec::new(),
        }
    }

    /// 工作器共享的关闭令牌
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 启动工作器
    pub fn start_worker(&mut self, worker: Arc<dyn Worker>) {
        let name = worker.name().to_string();
        info!("Starting worker {}", name);
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            let result = worker.run().await;
            // One worker stopping brings the others down too.
            shutdown.cancel();
            result
        });
        self.handles.push((name, handle));
    }

    /// 等待关闭信号或任一工作器退出，然后关闭全部工作器
    ///
    /// # 返回值
    ///
    /// 第一个以错误退出的工作器的错误
    pub async fn wait_for_shutdown(&mut self) -> Result<(), WorkerError> {
        tokio::select! {
            result = signal::ctrl_c() => match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(err) => error!("Unable to listen for shutdown signal: {}", err),
            },
            _ = self.shutdown.cancelled() => info!("Shutdown requested"),
        }
        self.shutdown().await
    }

    /// 取消所有工作器并等待其退出
    pub async fn shutdown(&mut self) -> Result<(), WorkerError> {
        info!("Shutting down workers...");
        self.shutdown.cancel();

        let mut first_error = None;
        for (name, handle) in self.handles.drain(..) {
            match handle.await {
                Ok(Ok(())) => info!("Worker {} stopped", name),
                Ok(Err(e)) => {
                    error!("Worker {} failed: {}", name, e);
                    first_error.get_or_insert(e);
                }
                Err(e) => error!("Worker {} panicked: {}", name, e),
            }
        }

        info!("Workers shut down");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
