// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器管理器测试模块
///
/// 验证工作器退出、关闭信号与错误传递

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dispatchrs::queue::batch_queue::QueueError;
    use dispatchrs::utils::errors::{IntakeError, WorkerError};
    use dispatchrs::workers::manager::WorkerManager;
    use dispatchrs::workers::Worker;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    /// 一直运行到收到关闭信号的工作器
    struct IdleWorker {
        shutdown: CancellationToken,
        stopped: AtomicBool,
    }

    #[async_trait]
    impl Worker for IdleWorker {
        async fn run(&self) -> Result<(), WorkerError> {
            self.shutdown.cancelled().await;
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "idle"
        }
    }

    /// 立即失败的工作器
    struct BrokenWorker;

    #[async_trait]
    impl Worker for BrokenWorker {
        async fn run(&self) -> Result<(), WorkerError> {
            Err(WorkerError::Intake(IntakeError::Queue(QueueError::Closed)))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_running_workers() {
        let mut manager = WorkerManager::new(CancellationToken::new());
        let worker = Arc::new(IdleWorker {
            shutdown: manager.shutdown_token(),
            stopped: AtomicBool::new(false),
        });
        manager.start_worker(worker.clone());

        manager.shutdown().await.unwrap();
        assert!(worker.stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_worker_triggers_shutdown_and_reports_error() {
        let mut manager = WorkerManager::new(CancellationToken::new());
        let idle = Arc::new(IdleWorker {
            shutdown: manager.shutdown_token(),
            stopped: AtomicBool::new(false),
        });
        manager.start_worker(idle.clone());
        manager.start_worker(Arc::new(BrokenWorker));

        let outcome = tokio::time::timeout(Duration::from_secs(5), manager.wait_for_shutdown())
            .await
            .expect("manager did not react to the failed worker");

        assert!(matches!(
            outcome,
            Err(WorkerError::Intake(IntakeError::Queue(QueueError::Closed)))
        ));
        assert!(idle.stopped.load(Ordering::SeqCst));
    }
}
