use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ReleaseConfig;
use crate::system::Downloader;

/// 发布页中指向具体版本的路径片段
pub const RELEASE_TAG_MARKER: &str = "/frp/releases/tag/v";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("无法创建下载目录 {path:?}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("所有下载源都失败（共尝试 {attempts} 个）: {last_error}")]
    AllSourcesFailed { attempts: usize, last_error: String },
}

/// 从页面中提取第一个 tag 链接后的版本号（仅数字与点）
pub fn extract_version(body: &str) -> Option<String> {
    let start = body.find(RELEASE_TAG_MARKER)? + RELEASE_TAG_MARKER.len();
    let version: String = body[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!version.is_empty()).then_some(version)
}

/// 版本探测与制品下载
pub struct ArtifactFetcher {
    downloader: Arc<dyn Downloader>,
    release: ReleaseConfig,
    scratch_dir: PathBuf,
}

impl ArtifactFetcher {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        release: ReleaseConfig,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            release,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// 按顺序尝试镜像；全部失败时返回固定的回退版本，不会报错
    pub async fn resolve_latest_version(&self) -> String {
        for mirror in &self.release.mirrors {
            tracing::info!("尝试从 {} 获取版本信息...", mirror);
            match self.downloader.fetch_text(mirror).await {
                Ok(body) => match extract_version(&body) {
                    Some(version) => {
                        tracing::info!("获取到版本: {}", version);
                        return version;
                    }
                    None => tracing::warn!("{} 的响应中没有版本信息", mirror),
                },
                Err(e) => tracing::warn!("从 {} 获取失败: {}", mirror, e),
            }
        }

        tracing::warn!(
            "无法获取最新版本，使用默认版本 {}",
            self.release.fallback_version
        );
        self.release.fallback_version.clone()
    }

    /// 官方地址在前，代理地址随后
    pub fn download_urls(&self, version: &str) -> Vec<String> {
        let canonical = self.release.canonical_download_url(version);
        let mut urls = vec![canonical.clone()];
        urls.extend(
            self.release
                .download_proxies
                .iter()
                .map(|proxy| format!("{proxy}{canonical}")),
        );
        urls
    }

    pub fn artifact_path(&self, version: &str) -> PathBuf {
        self.scratch_dir
            .join(format!("{}.tar.gz", self.release.artifact_stem(version)))
    }

    /// 依次尝试各下载源，返回本地制品路径
    ///
    /// 内容是否完整不在这里检查，由安装步骤校验。
    pub async fn download(&self, version: &str) -> Result<PathBuf, FetchError> {
        tokio::fs::create_dir_all(&self.scratch_dir)
            .await
            .map_err(|source| FetchError::Scratch {
                path: self.scratch_dir.clone(),
                source,
            })?;

        let dest = self.artifact_path(version);
        let urls = self.download_urls(version);
        let mut last_error = String::from("没有可用的下载源");

        for url in &urls {
            tracing::info!("尝试下载: {}", url);
            match self.downloader.fetch_to_file(url, &dest).await {
                Ok(bytes) if tokio::fs::try_exists(&dest).await.unwrap_or(false) => {
                    tracing::info!("下载成功: {} 字节 -> {:?}", bytes, dest);
                    return Ok(dest);
                }
                Ok(_) => {
                    last_error = format!("{url}: 下载完成但文件不存在");
                    tracing::warn!("{}", last_error);
                }
                Err(e) => {
                    last_error = format!("{url}: {e}");
                    tracing::warn!("下载失败: {}", last_error);
                    // 残留的半截文件不留给下一个源
                    let _ = tokio::fs::remove_file(&dest).await;
                }
            }
        }

        Err(FetchError::AllSourcesFailed {
            attempts: urls.len(),
            last_error,
        })
    }
}
