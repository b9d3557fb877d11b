//! 优雅退出
//!
//! 监听 SIGINT/SIGTERM（Windows 下为 Ctrl+C），只记录第一次触发的原因。

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C
    Interrupt,
    /// SIGTERM
    Terminate,
    /// 应用内部请求退出
    Application,
}

#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("信号设置失败: {0}")]
    SignalSetup(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ShutdownManager {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// 触发退出；重复触发被忽略
    pub fn trigger_shutdown(&self, reason: ShutdownReason) {
        let first = self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(reason);
            true
        });
        if first {
            info!("触发优雅退出: {:?}", reason);
        } else {
            debug!("重复的退出信号被忽略: {:?}", reason);
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// 等待退出；已经触发过时立即返回
    pub async fn wait_for_shutdown(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        match rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(ShutdownReason::Application),
            Err(_) => ShutdownReason::Application,
        }
    }

    pub fn start_signal_handler(&self) -> Result<(), ShutdownError> {
        let manager = self.clone();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut sigint = signal(SignalKind::interrupt())?;
            let mut sigterm = signal(SignalKind::terminate())?;
            tokio::spawn(async move {
                let reason = tokio::select! {
                    _ = sigint.recv() => ShutdownReason::Interrupt,
                    _ = sigterm.recv() => ShutdownReason::Terminate,
                };
                info!("接收到退出信号: {:?}", reason);
                manager.trigger_shutdown(reason);
            });
        }

        #[cfg(not(unix))]
        {
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("监听 Ctrl+C 失败: {}", e);
                    return;
                }
                manager.trigger_shutdown(ShutdownReason::Interrupt);
            });
        }

        Ok(())
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}
