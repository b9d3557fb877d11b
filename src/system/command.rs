use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// 外部命令默认超时（systemctl / journalctl / frpc --version）
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// 命令执行结果（stdout/stderr 已按 UTF-8 宽松解码）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// 成功退出且输出给定 stdout，测试替身常用
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// 以给定退出码失败
    pub fn exit(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            success: code == 0,
            code: Some(code),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// stderr 为空时退回 stdout，再退回退出码，用于拼接错误信息
    pub fn failure_detail(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// 命令执行错误：命令根本没有跑完（区别于“跑完但退出码非零”）
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("无法执行 {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} 执行超时（{secs}s）")]
    Timeout { program: String, secs: u64 },
}

/// 通用外部命令执行接口
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError>;
}

/// 基于 tokio::process 的实现，超时后子进程随 future 一起被杀掉
#[derive(Debug, Clone)]
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, CommandError> {
        tracing::debug!("执行命令: {} {}", program, args.join(" "));

        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(CommandError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(CommandError::Timeout {
                    program: program.to_string(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
