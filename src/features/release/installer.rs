use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{PathsConfig, ReleaseConfig};
use crate::features::frpc_config::store::sibling_with_suffix;
use crate::system::{ArchiveError, ArchiveTool, CommandRunner, ServiceError, ServiceManager};

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("创建安装目录失败: {0}")]
    InstallDir(#[source] io::Error),
    #[error("下载的文件无效: {0}")]
    InvalidArtifact(#[source] ArchiveError),
    #[error("无法创建解压目录: {0}")]
    Scratch(#[source] io::Error),
    #[error(transparent)]
    Extract(ArchiveError),
    #[error("制品中缺少 frpc: {0:?}")]
    MissingBinary(PathBuf),
    #[error("复制文件失败: {0}")]
    Place(#[source] io::Error),
    #[error("设置权限失败: {0}")]
    Permissions(#[source] io::Error),
    #[error("写入 systemd unit 失败: {0}")]
    UnitWrite(#[source] io::Error),
    #[error(transparent)]
    Unit(#[from] ServiceError),
}

/// 持有下载的制品，离开作用域时删除（无论成功与否）
struct ArtifactGuard(PathBuf);

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => tracing::debug!("已清理制品 {:?}", self.0),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("清理制品 {:?} 失败: {}", self.0, e),
        }
    }
}

/// systemd unit 模板，只由可执行文件与配置文件路径决定
pub fn unit_file_contents(binary: &Path, config: &Path) -> String {
    format!(
        r#"[Unit]
Description=FRP Client
After=network.target
Wants=network.target

[Service]
Type=simple
User=root
Restart=on-failure
RestartSec=5s
ExecStart={binary} -c {config}
LimitNOFILE=1048576

[Install]
WantedBy=multi-user.target
"#,
        binary = binary.display(),
        config = config.display(),
    )
}

/// 解析 `frpc --version` 输出；旧版本格式为 `frpc version X`
pub fn parse_version_output(output: &str) -> String {
    let text = output.trim();
    if text.contains("frpc version") {
        if let Some(version) = text.split_whitespace().nth(2) {
            return version.to_string();
        }
    }
    text.to_string()
}

pub(crate) async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// 解包制品、放置 frpc 并确保 systemd unit 存在
pub struct Installer {
    archive: Arc<dyn ArchiveTool>,
    manager: Arc<dyn ServiceManager>,
    runner: Arc<dyn CommandRunner>,
    paths: PathsConfig,
    release: ReleaseConfig,
}

impl Installer {
    pub fn new(
        archive: Arc<dyn ArchiveTool>,
        manager: Arc<dyn ServiceManager>,
        runner: Arc<dyn CommandRunner>,
        paths: PathsConfig,
        release: ReleaseConfig,
    ) -> Self {
        Self {
            archive,
            manager,
            runner,
            paths,
            release,
        }
    }

    pub async fn ensure_install_dir(&self) -> Result<(), InstallError> {
        if !path_exists(&self.paths.install_dir).await {
            tracing::info!("创建安装目录: {:?}", self.paths.install_dir);
            tokio::fs::create_dir_all(&self.paths.install_dir)
                .await
                .map_err(InstallError::InstallDir)?;
        }
        Ok(())
    }

    pub async fn install_dir_exists(&self) -> bool {
        path_exists(&self.paths.install_dir).await
    }

    pub async fn binary_exists(&self) -> bool {
        path_exists(&self.paths.binary_path).await
    }

    pub async fn unit_exists(&self) -> bool {
        path_exists(&self.paths.unit_path).await
    }

    /// 安装制品；制品文件与解压目录在任何退出路径上都会被清理
    pub async fn install(&self, artifact: PathBuf, version: &str) -> Result<(), InstallError> {
        let artifact = ArtifactGuard(artifact);

        if let Err(e) = self.archive.validate(&artifact.0).await {
            tracing::warn!("制品校验失败: {}", e);
            return Err(InstallError::InvalidArtifact(e));
        }

        tokio::fs::create_dir_all(&self.paths.scratch_dir)
            .await
            .map_err(InstallError::Scratch)?;
        let scratch = tempfile::Builder::new()
            .prefix("frpc-extract-")
            .tempdir_in(&self.paths.scratch_dir)
            .map_err(InstallError::Scratch)?;

        tracing::info!("解压文件...");
        self.archive
            .extract(&artifact.0, scratch.path())
            .await
            .map_err(InstallError::Extract)?;

        let extracted = scratch
            .path()
            .join(self.release.artifact_stem(version))
            .join("frpc");
        if !path_exists(&extracted).await {
            return Err(InstallError::MissingBinary(extracted));
        }

        self.place_binary(&extracted).await?;

        if let Err(e) = self.ensure_unit().await {
            tracing::error!("创建系统服务失败: {}", e);
        }

        tracing::info!("frpc {} 安装完成", version);
        Ok(())
    }

    /// 先复制到同目录的临时文件，再原子替换，运行中的旧进程不受影响
    async fn place_binary(&self, source: &Path) -> Result<(), InstallError> {
        let target = &self.paths.binary_path;
        let staged = sibling_with_suffix(target, "new");

        tokio::fs::copy(source, &staged)
            .await
            .map_err(InstallError::Place)?;

        if let Err(e) = set_executable(&staged).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(InstallError::Permissions(e));
        }

        if let Err(e) = tokio::fs::rename(&staged, target).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(InstallError::Place(e));
        }
        tracing::info!("frpc 已放置到 {:?}", target);
        Ok(())
    }

    /// unit 不存在时写入模板并 reload + enable；返回是否新建
    pub async fn ensure_unit(&self) -> Result<bool, InstallError> {
        if self.unit_exists().await {
            return Ok(false);
        }

        let contents = unit_file_contents(&self.paths.binary_path, &self.paths.config_path);
        tokio::fs::write(&self.paths.unit_path, contents)
            .await
            .map_err(InstallError::UnitWrite)?;
        self.manager.reload().await?;
        self.manager.enable().await?;

        tracing::info!("系统服务创建成功: {:?}", self.paths.unit_path);
        Ok(true)
    }

    /// 已安装版本：未安装为空串，无法执行为 "unknown"
    pub async fn installed_version(&self) -> String {
        if !self.binary_exists().await {
            return String::new();
        }
        let binary = self.paths.binary_path.to_string_lossy();
        match self.runner.run(&binary, &["--version"]).await {
            Ok(out) if out.success => parse_version_output(&out.stdout),
            Ok(out) => {
                tracing::debug!("frpc --version 失败: {}", out.failure_detail());
                "unknown".to_string()
            }
            Err(e) => {
                tracing::debug!("frpc --version 无法执行: {}", e);
                "unknown".to_string()
            }
        }
    }
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
