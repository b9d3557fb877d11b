use std::future::IntoFuture;
use std::time::Duration;

use frpc_panel::startup::{run_startup_checks, spawn_open_browser};
use frpc_panel::{AppConfig, AppState, Capabilities, ShutdownManager, SystemdWatchdog, build_app};

#[tokio::main]
async fn main() {
    let loaded = AppConfig::load();

    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("frpc_panel={level},tower_http=info").into()),
        )
        .init();

    let config = match loaded {
        Ok(c) => {
            tracing::info!("配置已加载: 监听 {}, frpc 目录 {:?}", c.server_addr(), c.paths.install_dir);
            c
        }
        Err(e) => {
            tracing::error!("配置加载失败: {}", e);
            std::process::exit(1);
        }
    };

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler() {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let watchdog = SystemdWatchdog::new(config.shutdown.watchdog.clone(), &shutdown_manager);
    if let Err(e) = watchdog.validate_config() {
        tracing::error!("看门狗配置验证失败: {}", e);
        std::process::exit(1);
    }

    let caps = match Capabilities::system(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("HTTP 客户端初始化失败: {}", e);
            std::process::exit(1);
        }
    };
    let state = AppState::new(config, caps.clone());
    let config = state.config.clone();

    if let Err(e) = run_startup_checks(&state).await {
        tracing::error!("系统初始化失败: {}", e);
        std::process::exit(1);
    }

    let app = build_app(state);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("绑定地址失败 {}: {}", addr, e);
            std::process::exit(1);
        });

    let url = config.local_url();
    tracing::info!("FRP 配置管理服务已启动: http://{}", addr);
    tracing::info!("请在浏览器中访问: {}", url);
    tracing::info!("Docs: {}/docs", url);

    if config.ui.open_browser {
        spawn_open_browser(
            caps.runner.clone(),
            url,
            Duration::from_secs(config.ui.open_delay_secs),
        );
    }

    watchdog.notify_ready();
    watchdog.spawn_heartbeat();

    let shutdown_timeout = config.shutdown.timeout_duration();
    let watchdog_for_shutdown = watchdog.clone();
    let signal_manager = shutdown_manager.clone();
    let graceful = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = signal_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅退出...", reason);
        watchdog_for_shutdown.notify_stopping();
    })
    .into_future();

    // 正在进行的安装或重启请求最多再等待 shutdown.timeout_secs
    let served = async {
        tokio::select! {
            res = graceful => res,
            _ = async {
                shutdown_manager.wait_for_shutdown().await;
                tokio::time::sleep(shutdown_timeout).await;
            } => {
                tracing::warn!("优雅退出超时，强制退出");
                Ok(())
            }
        }
    };

    if let Err(e) = served.await {
        tracing::error!("服务器运行错误: {}", e);
        std::process::exit(1);
    }

    tracing::info!("服务器已关闭");
}
