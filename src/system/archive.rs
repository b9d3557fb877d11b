use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use thiserror::Error;

/// 归档处理错误
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("无法打开 {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("归档内容损坏: {0}")]
    Corrupt(String),
    #[error("归档为空")]
    Empty,
    #[error("解压失败: {0}")]
    Extract(String),
    #[error("解包任务异常终止: {0}")]
    Join(String),
}

/// 归档校验与解包能力
#[async_trait]
pub trait ArchiveTool: Send + Sync {
    /// 完整读取一遍归档（相当于 `tar -tzf`），不写任何文件
    async fn validate(&self, archive: &Path) -> Result<(), ArchiveError>;
    /// 解包到 `dest`
    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArchiveError>;
}

/// `.tar.gz` 实现，解包工作放到 blocking 线程池
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzArchive;

fn open_archive(path: &Path) -> Result<tar::Archive<GzDecoder<File>>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

fn validate_blocking(path: &Path) -> Result<usize, ArchiveError> {
    let mut archive = open_archive(path)?;
    let mut count = 0usize;
    let entries = archive
        .entries()
        .map_err(|e| ArchiveError::Corrupt(e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| ArchiveError::Corrupt(e.to_string()))?;
        let expected = entry.size();
        // 读到底才能发现截断的 gzip 流
        let copied = io::copy(&mut entry, &mut io::sink())
            .map_err(|e| ArchiveError::Corrupt(e.to_string()))?;
        if copied != expected {
            return Err(ArchiveError::Corrupt(format!(
                "条目被截断（{copied}/{expected} 字节）"
            )));
        }
        count += 1;
    }
    if count == 0 {
        return Err(ArchiveError::Empty);
    }
    Ok(count)
}

fn extract_blocking(path: &Path, dest: &Path) -> Result<(), ArchiveError> {
    std::fs::create_dir_all(dest).map_err(|e| ArchiveError::Extract(e.to_string()))?;
    let mut archive = open_archive(path)?;
    archive
        .unpack(dest)
        .map_err(|e| ArchiveError::Extract(e.to_string()))
}

#[async_trait]
impl ArchiveTool for TarGzArchive {
    async fn validate(&self, archive: &Path) -> Result<(), ArchiveError> {
        let path = archive.to_path_buf();
        let count = tokio::task::spawn_blocking(move || validate_blocking(&path))
            .await
            .map_err(|e| ArchiveError::Join(e.to_string()))??;
        tracing::debug!("归档校验通过，共 {} 个条目", count);
        Ok(())
    }

    async fn extract(&self, archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
        let path = archive.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_blocking(&path, &dest))
            .await
            .map_err(|e| ArchiveError::Join(e.to_string()))?
    }
}
