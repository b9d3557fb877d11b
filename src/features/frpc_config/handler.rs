use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::get,
};
use serde::Serialize;

use super::models::FrpcConfig;
use crate::error::AppError;
use crate::features::service::verifier::ConnectionStatus;
use crate::state::AppState;

/// 保存配置的响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigResponse {
    #[schema(example = "配置保存成功，服务已重启")]
    pub message: String,
    /// frpc 尚未安装或服务未启用
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_install: Option<bool>,
    /// 重启后根据日志判断的连接状态
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<ConnectionStatus>,
}

impl SaveConfigResponse {
    fn need_install(message: &str) -> Self {
        Self {
            message: message.to_string(),
            need_install: Some(true),
            connection_status: None,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ConfigCheckResponse {
    pub exists: bool,
    #[schema(example = "/usr/local/frp/frpc.toml")]
    pub path: String,
}

#[utoipa::path(
    get,
    path = "/config",
    summary = "读取 frpc 配置",
    responses(
        (status = 200, description = "当前配置", body = FrpcConfig),
        (status = 500, description = "读取或解析失败", body = crate::error::ErrorResponse)
    ),
    tag = "Config"
)]
pub async fn get_config(State(state): State<AppState>) -> Result<Json<FrpcConfig>, AppError> {
    let config = state.config_store.load().await?;
    Ok(Json(config))
}

#[utoipa::path(
    post,
    path = "/config",
    summary = "保存 frpc 配置并重启服务",
    description = "整体覆盖写入配置（写入前自动备份）。frpc 已安装且服务已启用时重启服务，并根据最近日志判断是否连上服务端。",
    request_body = FrpcConfig,
    responses(
        (status = 200, description = "已保存；可能提示需要先安装", body = SaveConfigResponse),
        (status = 400, description = "请求体无效", body = crate::error::ErrorResponse),
        (status = 500, description = "保存或重启失败", body = crate::error::ErrorResponse)
    ),
    tag = "Config"
)]
pub async fn save_config(
    State(state): State<AppState>,
    payload: Result<Json<FrpcConfig>, JsonRejection>,
) -> Result<Json<SaveConfigResponse>, AppError> {
    let Json(config) =
        payload.map_err(|e| AppError::BadRequest(format!("无效的配置数据: {}", e.body_text())))?;

    let _guard = state.config_lock.lock().await;

    state
        .config_store
        .save(&config)
        .await
        .map_err(|e| AppError::from(e).context("保存配置失败"))?;

    if !state.installer.binary_exists().await {
        return Ok(Json(SaveConfigResponse::need_install(
            "配置已保存，请先安装 FRP 客户端",
        )));
    }

    if !state.service.is_enabled().await {
        return Ok(Json(SaveConfigResponse::need_install(
            "配置已保存，请先完成 FRP 客户端安装",
        )));
    }

    let outcome = state.service.restart().await.map_err(|e| {
        AppError::from(e)
            .context("重启服务失败")
            .context("保存配置失败")
    })?;
    tracing::info!("frpc 重启结果: {:?}", outcome);

    let connection_status = state.verifier.verify_recent_connection().await;

    Ok(Json(SaveConfigResponse {
        message: "配置保存成功，服务已重启".to_string(),
        need_install: None,
        connection_status: Some(connection_status),
    }))
}

#[utoipa::path(
    get,
    path = "/check",
    summary = "检查配置文件是否存在",
    responses((status = 200, description = "配置文件路径与存在性", body = ConfigCheckResponse)),
    tag = "Config"
)]
pub async fn check_config(State(state): State<AppState>) -> Json<ConfigCheckResponse> {
    Json(ConfigCheckResponse {
        exists: state.config_store.exists().await,
        path: state.config_store.path().display().to_string(),
    })
}

pub fn create_config_router() -> Router<AppState> {
    Router::new()
        .route("/config", get(get_config).post(save_config))
        .route("/check", get(check_config))
}
