use std::sync::Arc;

use serde::Serialize;

use crate::config::VerifyConfig;
use crate::system::{JournalQuery, ServiceManager};

const LOGIN_SUCCESS: &str = "login to server success";
const CONNECT_ERROR: &str = "connect to server error";
const LOGIN_FAILED: &str = "login to the server failed";

/// 日志判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Connected,
    Failed,
    Unknown,
}

/// 重启后的连接状态（基于日志关键字，非协议级确认）
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 判定所依据的日志片段
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logs: Option<String>,
    /// 日志读取失败时的原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 按已知关键字判定；成功关键字优先
pub fn classify(logs: &str) -> Verdict {
    if logs.contains(LOGIN_SUCCESS) {
        Verdict::Connected
    } else if logs.contains(CONNECT_ERROR) || logs.contains(LOGIN_FAILED) {
        Verdict::Failed
    } else {
        Verdict::Unknown
    }
}

impl ConnectionStatus {
    pub fn from_logs(logs: String) -> Self {
        let verdict = classify(&logs);
        let message = match verdict {
            Verdict::Connected => "成功连接到服务器",
            Verdict::Failed => "连接服务器失败",
            Verdict::Unknown => "服务状态未知，请查看日志",
        };
        Self {
            connected: verdict == Verdict::Connected,
            verdict,
            message: Some(message.to_string()),
            logs: Some(logs),
            error: None,
        }
    }

    fn unreadable(error: String) -> Self {
        Self {
            connected: false,
            verdict: Verdict::Unknown,
            message: None,
            logs: None,
            error: Some(format!("无法获取服务日志: {error}")),
        }
    }
}

/// 重启成功后检查 frpc 最近日志
pub struct ConnectivityVerifier {
    manager: Arc<dyn ServiceManager>,
    policy: VerifyConfig,
}

impl ConnectivityVerifier {
    pub fn new(manager: Arc<dyn ServiceManager>, policy: VerifyConfig) -> Self {
        Self { manager, policy }
    }

    pub async fn verify_recent_connection(&self) -> ConnectionStatus {
        // 给 frpc 留出输出登录日志的时间
        tokio::time::sleep(self.policy.grace_period()).await;

        let query = JournalQuery {
            lines: self.policy.max_lines,
            since_secs: Some(self.policy.window_secs),
        };
        match self.manager.journal(&query).await {
            Ok(logs) => {
                let status = ConnectionStatus::from_logs(logs);
                tracing::info!("连接校验结果: {:?}", status.verdict);
                status
            }
            Err(e) => {
                tracing::warn!("读取 frpc 日志失败: {}", e);
                ConnectionStatus::unreadable(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ServiceError, ServiceState};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct JournalOnly {
        reply: Result<String, String>,
        seen: Mutex<Option<JournalQuery>>,
    }

    #[async_trait]
    impl ServiceManager for JournalOnly {
        async fn start(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn restart(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn active_state(&self) -> Result<ServiceState, ServiceError> {
            Ok(ServiceState::Active)
        }
        async fn is_enabled(&self) -> Result<bool, ServiceError> {
            Ok(true)
        }
        async fn enable(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn reload(&self) -> Result<(), ServiceError> {
            Ok(())
        }
        async fn describe(&self) -> Result<String, ServiceError> {
            Ok(String::new())
        }
        async fn journal(&self, query: &JournalQuery) -> Result<String, ServiceError> {
            *self.seen.lock().unwrap() = Some(query.clone());
            self.reply.clone().map_err(ServiceError::Query)
        }
    }

    fn verifier(reply: Result<String, String>) -> (Arc<JournalOnly>, ConnectivityVerifier) {
        let manager = Arc::new(JournalOnly {
            reply,
            seen: Mutex::new(None),
        });
        let policy = VerifyConfig {
            grace_ms: 0,
            ..VerifyConfig::default()
        };
        (manager.clone(), ConnectivityVerifier::new(manager, policy))
    }

    #[test]
    fn classifies_known_markers() {
        assert_eq!(
            classify("[I] [service.go:301] [abc] login to server success, get run id [abc]"),
            Verdict::Connected
        );
        assert_eq!(
            classify("[W] connect to server error: dial tcp 1.2.3.4:7000: connection refused"),
            Verdict::Failed
        );
        assert_eq!(
            classify("[E] login to the server failed: i/o timeout"),
            Verdict::Failed
        );
        assert_eq!(classify("[I] start frpc service"), Verdict::Unknown);
    }

    #[test]
    fn success_marker_wins_over_earlier_failure() {
        let logs = "connect to server error: refused\nlogin to server success";
        assert_eq!(classify(logs), Verdict::Connected);
    }

    #[tokio::test]
    async fn queries_bounded_recent_window() {
        let (manager, verifier) = verifier(Ok("login to server success".into()));
        let status = verifier.verify_recent_connection().await;

        assert!(status.connected);
        assert_eq!(status.message.as_deref(), Some("成功连接到服务器"));
        assert_eq!(
            manager.seen.lock().unwrap().clone(),
            Some(JournalQuery {
                lines: 20,
                since_secs: Some(30)
            })
        );
    }

    #[tokio::test]
    async fn unknown_verdict_is_not_an_error() {
        let (_, verifier) = verifier(Ok("-- No entries --".into()));
        let status = verifier.verify_recent_connection().await;
        assert!(!status.connected);
        assert_eq!(status.verdict, Verdict::Unknown);
        assert!(status.error.is_none());
    }

    #[tokio::test]
    async fn unreadable_journal_reports_error() {
        let (_, verifier) = verifier(Err("journalctl missing".into()));
        let status = verifier.verify_recent_connection().await;
        assert!(!status.connected);
        assert!(status.error.unwrap().starts_with("无法获取服务日志"));
    }
}
