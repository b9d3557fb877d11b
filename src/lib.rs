/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 外部能力（进程、systemd、归档、下载）
pub mod system;

/// 功能聚合模块
pub mod features;

/// 应用状态聚合模块
pub mod state;

/// 路由组装
pub mod app;

/// OpenAPI 文档
pub mod openapi;

/// 请求 id 中间件
pub mod request_id;

/// 启动检查模块
pub mod startup;

/// 优雅退出管理模块
pub mod shutdown;

/// systemd 看门狗模块
pub mod watchdog;

// 导出常用类型供外部使用
pub use app::build_app;
pub use config::AppConfig;
pub use error::AppError;
pub use shutdown::{ShutdownManager, ShutdownReason};
pub use state::AppState;
pub use system::Capabilities;
pub use watchdog::SystemdWatchdog;
