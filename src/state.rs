use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::features::frpc_config::store::ConfigStore;
use crate::features::release::fetcher::ArtifactFetcher;
use crate::features::release::installer::Installer;
use crate::features::service::controller::ServiceController;
use crate::features::service::verifier::ConnectivityVerifier;
use crate::system::Capabilities;

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub config_store: Arc<ConfigStore>,
    pub service: Arc<ServiceController>,
    pub verifier: Arc<ConnectivityVerifier>,
    pub fetcher: Arc<ArtifactFetcher>,
    pub installer: Arc<Installer>,
    /// 安装与更新互斥
    pub install_lock: Arc<Mutex<()>>,
    /// 配置保存（含重启与校验）互斥
    pub config_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, caps: Capabilities) -> Self {
        let paths = config.paths.clone();
        let config_store = ConfigStore::new(paths.config_path.clone());
        let service = ServiceController::new(caps.service_manager.clone(), config.restart.clone());
        let verifier =
            ConnectivityVerifier::new(caps.service_manager.clone(), config.verify.clone());
        let fetcher = ArtifactFetcher::new(
            caps.downloader.clone(),
            config.release.clone(),
            paths.scratch_dir.clone(),
        );
        let installer = Installer::new(
            caps.archive.clone(),
            caps.service_manager.clone(),
            caps.runner.clone(),
            paths,
            config.release.clone(),
        );

        Self {
            config: Arc::new(config),
            config_store: Arc::new(config_store),
            service: Arc::new(service),
            verifier: Arc::new(verifier),
            fetcher: Arc::new(fetcher),
            installer: Arc::new(installer),
            install_lock: Arc::new(Mutex::new(())),
            config_lock: Arc::new(Mutex::new(())),
        }
    }
}
