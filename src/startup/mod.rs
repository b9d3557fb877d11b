/// 启动时打开浏览器
pub mod browser;
/// 启动检查：安装目录、systemd unit、服务启动
pub mod checks;

pub use browser::spawn_open_browser;
pub use checks::run_startup_checks;
