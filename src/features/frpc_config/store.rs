use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

use super::models::FrpcConfig;

/// 配置读写错误
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("读取配置文件失败: {0}")]
    Read(#[source] io::Error),
    #[error("解析配置文件失败: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("序列化配置失败: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("写入配置文件失败: {0}")]
    Write(#[source] io::Error),
}

/// 写入前的备份结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// 原文件不存在，无需备份
    Skipped,
    Created(PathBuf),
    /// 备份失败（不影响保存）
    Failed(String),
}

/// frpc TOML 配置文件的读写
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 只有明确的 NotFound 才视为不存在
    pub async fn exists(&self) -> bool {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => true,
            Err(e) => e.kind() != io::ErrorKind::NotFound,
        }
    }

    pub async fn load(&self) -> Result<FrpcConfig, ConfigStoreError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(ConfigStoreError::Read)?;
        Ok(toml::from_str(&text)?)
    }

    /// 整体覆盖写入；原文件存在时先复制一份带时间戳的备份
    pub async fn save(&self, config: &FrpcConfig) -> Result<BackupOutcome, ConfigStoreError> {
        self.save_at(config, Local::now()).await
    }

    pub(crate) async fn save_at(
        &self,
        config: &FrpcConfig,
        now: DateTime<Local>,
    ) -> Result<BackupOutcome, ConfigStoreError> {
        let data = toml::to_string(config)?;

        let backup = if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            let backup_path = self.backup_path(now);
            match tokio::fs::copy(&self.path, &backup_path).await {
                Ok(_) => {
                    tracing::info!("已备份原配置到 {:?}", backup_path);
                    BackupOutcome::Created(backup_path)
                }
                Err(e) => {
                    tracing::warn!("备份配置文件失败: {}", e);
                    BackupOutcome::Failed(e.to_string())
                }
            }
        } else {
            BackupOutcome::Skipped
        };

        // 先写临时文件再 rename，读者不会看到写了一半的配置
        let staged = sibling_with_suffix(&self.path, "tmp");
        if let Err(e) = tokio::fs::write(&staged, data.as_bytes()).await {
            return Err(ConfigStoreError::Write(e));
        }
        if let Err(e) = tokio::fs::rename(&staged, &self.path).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(ConfigStoreError::Write(e));
        }

        tracing::info!("配置已写入 {:?}", self.path);
        Ok(backup)
    }

    /// `<config>.backup.<YYYYMMDDHHMMSS>`
    pub fn backup_path(&self, now: DateTime<Local>) -> PathBuf {
        sibling_with_suffix(&self.path, &format!("backup.{}", now.format("%Y%m%d%H%M%S")))
    }
}

/// 在完整文件名后追加 `.suffix`
pub(crate) fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
