#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use flate2::Compression;
use flate2::write::GzEncoder;
use tower::ServiceExt;

use frpc_panel::config::{AppConfig, PathsConfig, ReleaseConfig, RestartConfig, VerifyConfig};
use frpc_panel::system::{
    ArchiveTool, Capabilities, CommandError, CommandOutput, CommandRunner, DownloadError,
    Downloader, JournalQuery, ServiceError, ServiceManager, ServiceState, TarGzArchive,
};
use frpc_panel::{AppState, build_app};

/// 内存中的 systemd
pub struct FakeManager {
    pub enabled: Mutex<bool>,
    pub state: Mutex<Result<ServiceState, String>>,
    pub journal: Mutex<Result<String, String>>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakeManager {
    fn default() -> Self {
        Self {
            enabled: Mutex::new(false),
            state: Mutex::new(Ok(ServiceState::Other("inactive".into()))),
            journal: Mutex::new(Ok(String::new())),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeManager {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl ServiceManager for FakeManager {
    async fn start(&self) -> Result<(), ServiceError> {
        self.record("start");
        Ok(())
    }

    async fn restart(&self) -> Result<(), ServiceError> {
        self.record("restart");
        Ok(())
    }

    async fn active_state(&self) -> Result<ServiceState, ServiceError> {
        self.state.lock().unwrap().clone().map_err(ServiceError::Query)
    }

    async fn is_enabled(&self) -> Result<bool, ServiceError> {
        Ok(*self.enabled.lock().unwrap())
    }

    async fn enable(&self) -> Result<(), ServiceError> {
        self.record("enable");
        *self.enabled.lock().unwrap() = true;
        Ok(())
    }

    async fn reload(&self) -> Result<(), ServiceError> {
        self.record("daemon-reload");
        Ok(())
    }

    async fn describe(&self) -> Result<String, ServiceError> {
        Ok("● frpc.service - FRP Client\n   Loaded: loaded".into())
    }

    async fn journal(&self, _query: &JournalQuery) -> Result<String, ServiceError> {
        self.journal.lock().unwrap().clone().map_err(ServiceError::Query)
    }
}

/// 所有命令都返回固定输出
pub struct FakeRunner(pub CommandOutput);

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, _program: &str, _args: &[&str]) -> Result<CommandOutput, CommandError> {
        Ok(self.0.clone())
    }
}

/// URL -> 响应体；未登记的 URL 返回网络错误
#[derive(Default)]
pub struct FakeDownloader {
    pub pages: Mutex<HashMap<String, Vec<u8>>>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn serve(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.pages.lock().unwrap().insert(url.into(), body.into());
    }

    fn lookup(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| DownloadError::Network(format!("{url}: connection refused")))
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        Ok(String::from_utf8_lossy(&self.lookup(url)?).into_owned())
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let body = self.lookup(url)?;
        tokio::fs::write(dest, &body).await?;
        Ok(body.len() as u64)
    }
}

pub struct Harness {
    pub root: tempfile::TempDir,
    pub config: AppConfig,
    pub manager: Arc<FakeManager>,
    pub downloader: Arc<FakeDownloader>,
    pub caps: Capabilities,
    pub state: AppState,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_runner(FakeRunner(CommandOutput::ok("0.63.0\n")))
    }

    pub fn with_runner(runner: FakeRunner) -> Self {
        Self::build(runner, |_| {})
    }

    /// 在测试默认配置之上再做调整
    pub fn configured(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(FakeRunner(CommandOutput::ok("0.63.0\n")), tweak)
    }

    fn build(runner: FakeRunner, tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let root = tempfile::tempdir().unwrap();
        let paths = PathsConfig::rooted_at(root.path());
        std::fs::create_dir_all(paths.unit_path.parent().unwrap()).unwrap();

        let mut config = AppConfig {
            paths,
            release: ReleaseConfig {
                mirrors: vec!["https://mirror-a/latest".into(), "https://mirror-b/latest".into()],
                ..ReleaseConfig::default()
            },
            restart: RestartConfig {
                poll_attempts: 3,
                poll_interval_ms: 1,
            },
            verify: VerifyConfig {
                grace_ms: 0,
                ..VerifyConfig::default()
            },
            ..AppConfig::default()
        };
        tweak(&mut config);

        let manager = Arc::new(FakeManager::default());
        let downloader = Arc::new(FakeDownloader::default());
        let archive: Arc<dyn ArchiveTool> = Arc::new(TarGzArchive);
        let caps = Capabilities {
            runner: Arc::new(runner),
            service_manager: manager.clone(),
            archive,
            downloader: downloader.clone(),
        };
        let state = AppState::new(config.clone(), caps.clone());

        Self {
            root,
            config,
            manager,
            downloader,
            caps,
            state,
        }
    }

    pub fn app(&self) -> Router {
        build_app(self.state.clone())
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.config.paths
    }

    /// 模拟已安装的 frpc
    pub fn install_fake_binary(&self) {
        std::fs::create_dir_all(&self.paths().install_dir).unwrap();
        std::fs::write(&self.paths().binary_path, "#!/bin/sh\n").unwrap();
    }

    /// 写入一份最小的 frpc 配置
    pub fn write_config(&self) {
        std::fs::create_dir_all(&self.paths().install_dir).unwrap();
        std::fs::write(&self.paths().config_path, "serverAddr = \"127.0.0.1\"\n").unwrap();
    }

    /// 非 JSON 响应（静态页面）
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = self.app().oneshot(req).await.expect("call app");
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(self.app(), req).await
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(self.app(), req).await
    }
}

pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.oneshot(req).await.expect("call app");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// 与官方发布包相同布局的 tar.gz：`frp_{v}_linux_amd64/frpc`
pub fn release_tarball(version: &str) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let data = b"#!/bin/sh\necho frpc\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(
            &mut header,
            format!("frp_{version}_linux_amd64/frpc"),
            &data[..],
        )
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}
