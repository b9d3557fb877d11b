use crate::features::release::InstallError;
use crate::state::AppState;

/// 启动检查
///
/// 1. 确保安装目录存在（唯一的致命错误）
/// 2. frpc 不存在时直接返回，等待用户通过页面安装
/// 3. systemd unit 缺失时补建
/// 4. 配置文件存在时尝试启动服务
pub async fn run_startup_checks(state: &AppState) -> Result<(), InstallError> {
    tracing::info!("开始系统初始化检查...");

    state.installer.ensure_install_dir().await?;

    if !state.installer.binary_exists().await {
        tracing::info!("frpc 客户端不存在，需要安装");
        return Ok(());
    }

    match state.installer.ensure_unit().await {
        Ok(true) => tracing::info!("已补建缺失的系统服务"),
        Ok(false) => {}
        Err(e) => tracing::warn!("创建系统服务失败: {}", e),
    }

    if state.config_store.exists().await {
        tracing::info!("配置文件存在，尝试启动服务...");
        if let Err(e) = state.service.start().await {
            tracing::warn!("启动服务失败: {}", e);
        }
    }

    tracing::info!("系统初始化检查完成");
    Ok(())
}
