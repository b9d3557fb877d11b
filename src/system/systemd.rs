use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::command::{CommandError, CommandRunner};

/// 服务管理器相关错误
#[derive(Debug, Error)]
pub enum ServiceError {
    /// systemctl/journalctl 无法执行
    #[error(transparent)]
    Command(#[from] CommandError),

    /// 命令执行完成但返回失败
    #[error("{action} 失败: {detail}")]
    Action { action: String, detail: String },

    /// 状态查询没有拿到任何输出
    #[error("无法获取服务状态: {0}")]
    Query(String),

    /// 服务进入 failed 状态
    #[error("服务启动失败: {0}")]
    StartFailed(String),
}

/// systemd 报告的运行状态（`systemctl is-active` 的输出）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Active,
    Activating,
    Failed,
    Other(String),
}

impl ServiceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "active" => ServiceState::Active,
            "activating" => ServiceState::Activating,
            "failed" => ServiceState::Failed,
            other => ServiceState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ServiceState::Active => "active",
            ServiceState::Activating => "activating",
            ServiceState::Failed => "failed",
            ServiceState::Other(s) => s,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 日志查询窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalQuery {
    /// 最多返回的行数
    pub lines: u32,
    /// 只看最近多少秒
    pub since_secs: Option<u64>,
}

/// 服务管理器能力
#[async_trait]
pub trait ServiceManager: Send + Sync {
    async fn start(&self) -> Result<(), ServiceError>;
    async fn restart(&self) -> Result<(), ServiceError>;
    /// 当前运行状态；只有拿不到任何状态文本时才返回错误
    async fn active_state(&self) -> Result<ServiceState, ServiceError>;
    async fn is_enabled(&self) -> Result<bool, ServiceError>;
    async fn enable(&self) -> Result<(), ServiceError>;
    /// 重新加载 unit 定义
    async fn reload(&self) -> Result<(), ServiceError>;
    /// 详细状态文本（`systemctl status -l`）
    async fn describe(&self) -> Result<String, ServiceError>;
    async fn journal(&self, query: &JournalQuery) -> Result<String, ServiceError>;
}

/// 通过 systemctl/journalctl 管理单个 unit
pub struct Systemd {
    runner: Arc<dyn CommandRunner>,
    unit: String,
}

impl Systemd {
    pub fn new(runner: Arc<dyn CommandRunner>, unit: impl Into<String>) -> Self {
        Self {
            runner,
            unit: unit.into(),
        }
    }

    async fn systemctl(&self, args: &[&str]) -> Result<(), ServiceError> {
        let out = self.runner.run("systemctl", args).await?;
        if out.success {
            Ok(())
        } else {
            Err(ServiceError::Action {
                action: format!("systemctl {}", args.join(" ")),
                detail: out.failure_detail(),
            })
        }
    }

    /// start/restart 超时只说明 systemctl 客户端没等到 job 完成；
    /// job 已经提交给 systemd，后续由状态轮询判断结果
    async fn lifecycle(&self, verb: &str) -> Result<(), ServiceError> {
        match self.systemctl(&[verb, &self.unit]).await {
            Err(ServiceError::Command(CommandError::Timeout { secs, .. })) => {
                tracing::warn!(
                    "systemctl {} {} 在 {}s 内未返回，改由状态轮询确认",
                    verb,
                    self.unit,
                    secs
                );
                Ok(())
            }
            other => other,
        }
    }
}

#[async_trait]
impl ServiceManager for Systemd {
    async fn start(&self) -> Result<(), ServiceError> {
        self.lifecycle("start").await
    }

    async fn restart(&self) -> Result<(), ServiceError> {
        self.lifecycle("restart").await
    }

    async fn active_state(&self) -> Result<ServiceState, ServiceError> {
        // is-active 对非 active 状态返回非零退出码，但 stdout 仍是状态名
        let out = self.runner.run("systemctl", &["is-active", &self.unit]).await?;
        let text = out.stdout.trim();
        if text.is_empty() {
            return Err(ServiceError::Query(out.failure_detail()));
        }
        Ok(ServiceState::parse(text))
    }

    async fn is_enabled(&self) -> Result<bool, ServiceError> {
        let out = self.runner.run("systemctl", &["is-enabled", &self.unit]).await?;
        Ok(out.success)
    }

    async fn enable(&self) -> Result<(), ServiceError> {
        self.systemctl(&["enable", &self.unit]).await
    }

    async fn reload(&self) -> Result<(), ServiceError> {
        self.systemctl(&["daemon-reload"]).await
    }

    async fn describe(&self) -> Result<String, ServiceError> {
        // inactive 时 status 退出码为 3，输出依然有效
        let out = self
            .runner
            .run("systemctl", &["status", &self.unit, "--no-pager", "-l"])
            .await?;
        Ok(out.stdout)
    }

    async fn journal(&self, query: &JournalQuery) -> Result<String, ServiceError> {
        let lines = query.lines.to_string();
        let since = query.since_secs.map(|secs| format!("{secs} seconds ago"));

        let mut args = vec!["-u", self.unit.as_str(), "--no-pager", "-n", lines.as_str()];
        if let Some(since) = since.as_deref() {
            args.extend(["--since", since]);
        }

        let out = self.runner.run("journalctl", &args).await?;
        if !out.success {
            return Err(ServiceError::Action {
                action: "journalctl".to_string(),
                detail: out.failure_detail(),
            });
        }
        Ok(out.stdout)
    }
}
