use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "0.0.0.0".to_string()
    }
    fn default_port() -> u16 {
        8888
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（未设置 RUST_LOG 时生效）
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// frpc 相关的固定路径
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 安装目录
    #[serde(default = "PathsConfig::default_install_dir")]
    pub install_dir: PathBuf,
    /// frpc 可执行文件路径
    #[serde(default = "PathsConfig::default_binary_path")]
    pub binary_path: PathBuf,
    /// frpc TOML 配置文件路径
    #[serde(default = "PathsConfig::default_config_path")]
    pub config_path: PathBuf,
    /// systemd 服务名
    #[serde(default = "PathsConfig::default_service_name")]
    pub service_name: String,
    /// systemd unit 文件路径
    #[serde(default = "PathsConfig::default_unit_path")]
    pub unit_path: PathBuf,
    /// 下载与解压使用的临时目录
    #[serde(default = "PathsConfig::default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

impl PathsConfig {
    fn default_install_dir() -> PathBuf {
        PathBuf::from("/usr/local/frp")
    }
    fn default_binary_path() -> PathBuf {
        PathBuf::from("/usr/local/frp/frpc")
    }
    fn default_config_path() -> PathBuf {
        PathBuf::from("/usr/local/frp/frpc.toml")
    }
    fn default_service_name() -> String {
        "frpc.service".to_string()
    }
    fn default_unit_path() -> PathBuf {
        PathBuf::from("/etc/systemd/system/frpc.service")
    }
    fn default_scratch_dir() -> PathBuf {
        std::env::temp_dir()
    }

    /// 以同一个根目录派生全部路径（测试与非 root 部署使用）
    pub fn rooted_at(root: &Path) -> Self {
        let install_dir = root.join("frp");
        Self {
            binary_path: install_dir.join("frpc"),
            config_path: install_dir.join("frpc.toml"),
            install_dir,
            service_name: Self::default_service_name(),
            unit_path: root.join("systemd").join("frpc.service"),
            scratch_dir: root.join("tmp"),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            install_dir: Self::default_install_dir(),
            binary_path: Self::default_binary_path(),
            config_path: Self::default_config_path(),
            service_name: Self::default_service_name(),
            unit_path: Self::default_unit_path(),
            scratch_dir: Self::default_scratch_dir(),
        }
    }
}

/// 发布源配置（版本探测与下载）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// 官方 releases 基地址
    #[serde(default = "ReleaseConfig::default_repo_url")]
    pub repo_url: String,
    /// 目标平台后缀，如 linux_amd64
    #[serde(default = "ReleaseConfig::default_platform")]
    pub platform: String,
    /// 版本探测镜像（按顺序尝试）
    #[serde(default = "ReleaseConfig::default_mirrors")]
    pub mirrors: Vec<String>,
    /// 下载代理前缀（官方地址之后按顺序尝试）
    #[serde(default = "ReleaseConfig::default_download_proxies")]
    pub download_proxies: Vec<String>,
    /// 全部镜像失败时使用的版本
    #[serde(default = "ReleaseConfig::default_fallback_version")]
    pub fallback_version: String,
    /// 版本探测连接超时（秒）
    #[serde(default = "ReleaseConfig::default_probe_connect_timeout")]
    pub probe_connect_timeout_secs: u64,
    /// 版本探测总超时（秒）
    #[serde(default = "ReleaseConfig::default_probe_timeout")]
    pub probe_timeout_secs: u64,
    /// 下载连接超时（秒）
    #[serde(default = "ReleaseConfig::default_download_connect_timeout")]
    pub download_connect_timeout_secs: u64,
    /// 下载总超时（秒）
    #[serde(default = "ReleaseConfig::default_download_timeout")]
    pub download_timeout_secs: u64,
}

impl ReleaseConfig {
    fn default_repo_url() -> String {
        "https://github.com/fatedier/frp/releases".to_string()
    }
    fn default_platform() -> String {
        "linux_amd64".to_string()
    }
    fn default_mirrors() -> Vec<String> {
        [
            "https://ghfast.top/",
            "https://hk.gh-proxy.com/",
            "https://gh-proxy.com/",
            "https://hk.gh-proxy.com/",
            "https://gh-proxy.com/",
            "https://cdn.gh-proxy.com/",
            "https://edgeone.gh-proxy.com/",
        ]
        .iter()
        .map(|prefix| format!("{prefix}https://github.com/fatedier/frp/releases/latest"))
        .collect()
    }
    fn default_download_proxies() -> Vec<String> {
        vec!["https://ghfast.top/".to_string()]
    }
    fn default_fallback_version() -> String {
        "0.63.0".to_string()
    }
    fn default_probe_connect_timeout() -> u64 {
        3
    }
    fn default_probe_timeout() -> u64 {
        15
    }
    fn default_download_connect_timeout() -> u64 {
        30
    }
    fn default_download_timeout() -> u64 {
        300
    }

    /// 制品目录名，如 `frp_0.63.0_linux_amd64`
    pub fn artifact_stem(&self, version: &str) -> String {
        format!("frp_{version}_{}", self.platform)
    }

    /// 官方下载地址
    pub fn canonical_download_url(&self, version: &str) -> String {
        format!(
            "{}/download/v{version}/{}.tar.gz",
            self.repo_url.trim_end_matches('/'),
            self.artifact_stem(version)
        )
    }
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            repo_url: Self::default_repo_url(),
            platform: Self::default_platform(),
            mirrors: Self::default_mirrors(),
            download_proxies: Self::default_download_proxies(),
            fallback_version: Self::default_fallback_version(),
            probe_connect_timeout_secs: Self::default_probe_connect_timeout(),
            probe_timeout_secs: Self::default_probe_timeout(),
            download_connect_timeout_secs: Self::default_download_connect_timeout(),
            download_timeout_secs: Self::default_download_timeout(),
        }
    }
}

/// 重启轮询配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartConfig {
    /// 最大轮询次数
    #[serde(default = "RestartConfig::default_poll_attempts")]
    pub poll_attempts: u32,
    /// 轮询间隔（毫秒）
    #[serde(default = "RestartConfig::default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl RestartConfig {
    fn default_poll_attempts() -> u32 {
        10
    }
    fn default_poll_interval() -> u64 {
        1000
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            poll_attempts: Self::default_poll_attempts(),
            poll_interval_ms: Self::default_poll_interval(),
        }
    }
}

/// 重启后连接校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// 读取日志前的等待时间（毫秒）
    #[serde(default = "VerifyConfig::default_grace")]
    pub grace_ms: u64,
    /// 日志时间窗口（秒）
    #[serde(default = "VerifyConfig::default_window")]
    pub window_secs: u64,
    /// 日志行数上限
    #[serde(default = "VerifyConfig::default_max_lines")]
    pub max_lines: u32,
}

impl VerifyConfig {
    fn default_grace() -> u64 {
        3000
    }
    fn default_window() -> u64 {
        30
    }
    fn default_max_lines() -> u32 {
        20
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            grace_ms: Self::default_grace(),
            window_secs: Self::default_window(),
            max_lines: Self::default_max_lines(),
        }
    }
}

/// 日志接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    /// `/api/logs` 返回的行数
    #[serde(default = "LogsConfig::default_lines")]
    pub lines: u32,
}

impl LogsConfig {
    fn default_lines() -> u32 {
        50
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            lines: Self::default_lines(),
        }
    }
}

/// 安装流程配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstallConfig {
    /// 安装完成且配置文件存在时是否立即启动服务
    #[serde(default)]
    pub start_after_install: bool,
}

/// Web 界面配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// 启动后是否尝试打开浏览器
    #[serde(default = "UiConfig::default_open_browser")]
    pub open_browser: bool,
    /// 打开浏览器前的延迟（秒）
    #[serde(default = "UiConfig::default_open_delay")]
    pub open_delay_secs: u64,
    /// 静态页面目录（包含 index.html），留空则不提供页面
    #[serde(default)]
    pub web_dir: Option<PathBuf>,
}

impl UiConfig {
    fn default_open_browser() -> bool {
        true
    }
    fn default_open_delay() -> u64 {
        2
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            open_browser: Self::default_open_browser(),
            open_delay_secs: Self::default_open_delay(),
            web_dir: None,
        }
    }
}

/// 优雅退出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// 优雅退出超时时间（秒）
    #[serde(default = "ShutdownConfig::default_timeout")]
    pub timeout_secs: u64,
    /// Linux systemd 看门狗配置
    #[serde(default)]
    pub watchdog: WatchdogConfig,
}

impl ShutdownConfig {
    fn default_timeout() -> u64 {
        10
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout(),
            watchdog: WatchdogConfig::default(),
        }
    }
}

/// systemd 看门狗配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// 是否启用看门狗
    #[serde(default)]
    pub enabled: bool,
    /// 心跳间隔时间（秒）
    #[serde(default = "WatchdogConfig::default_interval")]
    pub interval_secs: u64,
}

impl WatchdogConfig {
    fn default_interval() -> u64 {
        10
    }

    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: Self::default_interval(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
    #[serde(default)]
    pub restart: RestartConfig,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub logs: LogsConfig,
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

impl AppConfig {
    /// 从 `config.toml`（可选）加载配置，支持环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    /// 从指定文件加载配置；文件不存在时全部使用默认值
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::builder()
            .add_source(File::from(path).required(false))
            // 例如：APP_SERVER__PORT=9000
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        builder.try_deserialize()
    }

    /// 获取服务器监听地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 浏览器访问地址
    pub fn local_url(&self) -> String {
        format!("http://localhost:{}", self.server.port)
    }
}
