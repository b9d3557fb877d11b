use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// 安装状态汇总，每次请求实时计算
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub install_dir_exists: bool,
    pub frpc_exists: bool,
    pub service_exists: bool,
    pub config_exists: bool,
    /// 未安装为空串；无法执行为 "unknown"
    #[schema(example = "0.63.0")]
    pub frpc_version: String,
    #[schema(example = "0.63.0")]
    pub latest_version: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "frpc 安装成功")]
    pub message: String,
}

#[utoipa::path(
    get,
    path = "/system-status",
    summary = "安装状态汇总",
    description = "目录、可执行文件、systemd unit、配置文件是否存在，已安装版本与远端最新版本。最新版本需要联网探测，可能较慢。",
    responses((status = 200, description = "安装状态", body = SystemStatus)),
    tag = "Release"
)]
pub async fn get_system_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let installer = &state.installer;
    let (install_dir_exists, frpc_exists, service_exists, config_exists) = tokio::join!(
        installer.install_dir_exists(),
        installer.binary_exists(),
        installer.unit_exists(),
        state.config_store.exists(),
    );
    let (frpc_version, latest_version) = tokio::join!(
        installer.installed_version(),
        state.fetcher.resolve_latest_version(),
    );

    Json(SystemStatus {
        install_dir_exists,
        frpc_exists,
        service_exists,
        config_exists,
        frpc_version,
        latest_version,
    })
}

#[utoipa::path(
    post,
    path = "/install-frpc",
    summary = "安装 frpc",
    responses(
        (status = 200, description = "安装成功", body = MessageResponse),
        (status = 500, description = "安装失败", body = crate::error::ErrorResponse)
    ),
    tag = "Release"
)]
pub async fn install_frpc(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    let _guard = state.install_lock.lock().await;
    super::download_and_install(&state)
        .await
        .map_err(|e| e.context("安装失败"))?;
    Ok(Json(MessageResponse {
        message: "frpc 安装成功".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/update-frpc",
    summary = "更新 frpc",
    description = "与安装流程相同，覆盖现有可执行文件。",
    responses(
        (status = 200, description = "更新成功", body = MessageResponse),
        (status = 500, description = "更新失败", body = crate::error::ErrorResponse)
    ),
    tag = "Release"
)]
pub async fn update_frpc(State(state): State<AppState>) -> Result<Json<MessageResponse>, AppError> {
    let _guard = state.install_lock.lock().await;
    super::download_and_install(&state)
        .await
        .map_err(|e| e.context("更新失败"))?;
    Ok(Json(MessageResponse {
        message: "frpc 更新成功".to_string(),
    }))
}

pub fn create_release_router() -> Router<AppState> {
    Router::new()
        .route("/system-status", get(get_system_status))
        .route("/install-frpc", post(install_frpc))
        .route("/update-frpc", post(update_frpc))
}
