use std::sync::Arc;

use serde::Serialize;

use crate::config::RestartConfig;
use crate::system::{JournalQuery, ServiceError, ServiceManager, ServiceState};

/// 重启后的收敛结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    /// 轮询期间观察到 active
    Converged,
    /// 轮询次数耗尽且最终状态不是 failed（或无法查询），按成功处理
    ConvergedUnknown { last_state: Option<ServiceState> },
}

/// 粗粒度运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Stopped,
}

/// frpc systemd 服务的控制器
pub struct ServiceController {
    manager: Arc<dyn ServiceManager>,
    policy: RestartConfig,
}

impl ServiceController {
    pub fn new(manager: Arc<dyn ServiceManager>, policy: RestartConfig) -> Self {
        Self { manager, policy }
    }

    /// 重启服务并轮询直到 active / failed 或次数耗尽
    pub async fn restart(&self) -> Result<RestartOutcome, ServiceError> {
        self.manager.restart().await?;
        tracing::info!("frpc 服务已通过 systemctl 重启");

        let interval = self.policy.poll_interval();
        for attempt in 1..=self.policy.poll_attempts {
            tokio::time::sleep(interval).await;

            match self.manager.active_state().await {
                Ok(ServiceState::Active) => {
                    tracing::info!("frpc 服务状态: active（第 {} 次检查）", attempt);
                    return Ok(RestartOutcome::Converged);
                }
                Ok(ServiceState::Failed) => {
                    return Err(ServiceError::StartFailed(ServiceState::Failed.to_string()));
                }
                Ok(ServiceState::Activating) => {
                    tracing::info!("frpc 服务正在启动中（第 {} 次检查）", attempt);
                }
                Ok(other) => {
                    tracing::debug!("frpc 服务状态: {}（第 {} 次检查）", other, attempt);
                }
                Err(e) => {
                    tracing::debug!("查询服务状态失败，继续等待: {}", e);
                }
            }
        }

        match self.manager.active_state().await {
            Err(e) => {
                tracing::warn!("无法检查服务状态，但重启命令已执行: {}", e);
                Ok(RestartOutcome::ConvergedUnknown { last_state: None })
            }
            Ok(ServiceState::Failed) => {
                Err(ServiceError::StartFailed(ServiceState::Failed.to_string()))
            }
            Ok(ServiceState::Active) => Ok(RestartOutcome::Converged),
            Ok(state) => {
                tracing::warn!("frpc 服务最终状态: {}，按成功处理", state);
                Ok(RestartOutcome::ConvergedUnknown {
                    last_state: Some(state),
                })
            }
        }
    }

    pub async fn start(&self) -> Result<(), ServiceError> {
        self.manager.start().await
    }

    /// 查询失败时返回 Stopped
    pub async fn status(&self) -> RunStatus {
        match self.manager.active_state().await {
            Ok(ServiceState::Active) => RunStatus::Running,
            _ => RunStatus::Stopped,
        }
    }

    /// 查询失败时返回 false
    pub async fn is_enabled(&self) -> bool {
        self.manager.is_enabled().await.unwrap_or(false)
    }

    /// 原始状态文本与 `systemctl status` 输出，尽力而为
    pub async fn service_info(&self) -> (String, String) {
        let status = self
            .manager
            .active_state()
            .await
            .map(|s| s.to_string())
            .unwrap_or_default();
        let info = self.manager.describe().await.unwrap_or_default();
        (status, info)
    }

    pub async fn recent_logs(&self, lines: u32) -> Result<String, ServiceError> {
        self.manager
            .journal(&JournalQuery {
                lines,
                since_secs: None,
            })
            .await
    }
}
