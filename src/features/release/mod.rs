pub mod fetcher;
pub mod handler;
pub mod installer;

pub use fetcher::{ArtifactFetcher, FetchError};
pub use handler::create_release_router;
pub use installer::{InstallError, Installer};

use crate::error::AppError;
use crate::state::AppState;

/// 完整安装流程：准备目录、探测版本、下载、安装，按配置决定是否启动服务
///
/// 安装与更新共用此流程。
pub async fn download_and_install(state: &AppState) -> Result<String, AppError> {
    tracing::info!("开始下载并安装 frpc...");

    state.installer.ensure_install_dir().await?;

    let version = state.fetcher.resolve_latest_version().await;
    tracing::info!("最新版本: {}", version);

    let artifact = state.fetcher.download(&version).await?;
    state.installer.install(artifact, &version).await?;

    if state.config.install.start_after_install && state.config_store.exists().await {
        if let Err(e) = state.service.start().await {
            tracing::warn!("安装后启动 frpc 服务失败: {}", e);
        }
    }

    Ok(version)
}
