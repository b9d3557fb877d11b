use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use crate::config::ReleaseConfig;

/// 单个下载源的失败原因
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("网络错误: {0}")]
    Network(String),
    #[error("请求超时: {0}")]
    Timeout(String),
    #[error("HTTP 状态码 {0}")]
    Status(u16),
    #[error("写入文件失败: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DownloadError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            DownloadError::Status(status.as_u16())
        } else {
            DownloadError::Network(err.to_string())
        }
    }
}

/// HTTP 拉取能力
#[async_trait]
pub trait Downloader: Send + Sync {
    /// 获取页面文本（短超时，用于版本探测）
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError>;
    /// 流式写入 `dest`，返回写入字节数（长超时，用于制品下载）
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError>;
}

/// reqwest 实现：探测与下载使用不同超时的两个 Client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    probe: Client,
    download: Client,
}

impl HttpDownloader {
    pub fn new(release: &ReleaseConfig) -> Result<Self, reqwest::Error> {
        let user_agent = concat!("frpc-panel/", env!("CARGO_PKG_VERSION"));
        let probe = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(release.probe_connect_timeout_secs))
            .timeout(Duration::from_secs(release.probe_timeout_secs))
            .build()?;
        let download = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(release.download_connect_timeout_secs))
            .timeout(Duration::from_secs(release.download_timeout_secs))
            .build()?;
        Ok(Self { probe, download })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        let resp = self.probe.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let resp = self.download.get(url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// 只回应一次固定 HTTP 响应的本地服务
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let resp = format!(
                    "{status_line}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(resp.as_bytes()).await;
            }
        });
        format!("http://{addr}/")
    }

    fn downloader() -> HttpDownloader {
        HttpDownloader::new(&ReleaseConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn fetch_text_returns_body() {
        let url = serve_once("HTTP/1.1 200 OK", "see /frp/releases/tag/v0.61.1").await;
        let body = downloader().fetch_text(&url).await.unwrap();
        assert!(body.contains("v0.61.1"));
    }

    #[tokio::test]
    async fn fetch_to_file_rejects_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found", "missing").await;
        let dir = tempfile::tempdir().unwrap();
        let err = downloader()
            .fetch_to_file(&url, &dir.path().join("a.tar.gz"))
            .await
            .unwrap_err();
        assert!(matches!(err, DownloadError::Status(404)));
    }

    #[tokio::test]
    async fn fetch_to_file_writes_body() {
        let url = serve_once("HTTP/1.1 200 OK", "archive-bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a.tar.gz");
        let written = downloader().fetch_to_file(&url, &dest).await.unwrap();
        assert_eq!(written, 13);
        assert_eq!(std::fs::read_to_string(dest).unwrap(), "archive-bytes");
    }
}
