//! 外部能力抽象：进程执行、systemd、归档解包与 HTTP 下载。
//!
//! 控制逻辑只依赖这里的 trait，测试中可以替换为内存实现，不触碰真实系统服务。

pub mod archive;
pub mod command;
pub mod download;
pub mod systemd;

use std::sync::Arc;

use crate::config::AppConfig;

pub use archive::{ArchiveError, ArchiveTool, TarGzArchive};
pub use command::{CommandError, CommandOutput, CommandRunner, TokioCommandRunner};
pub use download::{DownloadError, Downloader, HttpDownloader};
pub use systemd::{JournalQuery, ServiceError, ServiceManager, ServiceState, Systemd};

/// 控制器依赖的全部外部能力
#[derive(Clone)]
pub struct Capabilities {
    pub runner: Arc<dyn CommandRunner>,
    pub service_manager: Arc<dyn ServiceManager>,
    pub archive: Arc<dyn ArchiveTool>,
    pub downloader: Arc<dyn Downloader>,
}

impl Capabilities {
    /// 生产环境实现：tokio 进程 + systemctl/journalctl + tar.gz + reqwest
    pub fn system(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let runner: Arc<dyn CommandRunner> =
            Arc::new(TokioCommandRunner::new(command::DEFAULT_CMD_TIMEOUT));
        let service_manager = Arc::new(Systemd::new(
            runner.clone(),
            config.paths.service_name.clone(),
        ));
        Ok(Self {
            runner,
            service_manager,
            archive: Arc::new(TarGzArchive),
            downloader: Arc::new(HttpDownloader::new(&config.release)?),
        })
    }
}
