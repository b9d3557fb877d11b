use std::sync::Arc;
use std::time::Duration;

use crate::system::CommandRunner;

/// 当前平台打开 URL 的命令
pub fn open_command(url: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "windows") {
        (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
        )
    } else if cfg!(target_os = "macos") {
        ("open", vec![url.to_string()])
    } else {
        ("xdg-open", vec![url.to_string()])
    }
}

/// 延迟后尝试打开一次浏览器；失败只记日志
pub fn spawn_open_browser(runner: Arc<dyn CommandRunner>, url: String, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        let (program, args) = open_command(&url);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match runner.run(program, &args).await {
            Ok(out) if out.success => tracing::debug!("已打开浏览器: {}", url),
            Ok(out) => tracing::info!("无法自动打开浏览器: {}", out.failure_detail()),
            Err(e) => tracing::info!("无法自动打开浏览器: {}", e),
        }
    });
}
