use axum::{Router, extract::State, response::Json, routing::get};
use serde::Serialize;

use super::controller::RunStatus;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: RunStatus,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LogsResponse {
    pub logs: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ServiceStatusResponse {
    /// `systemctl is-active` 原始输出
    #[schema(example = "active")]
    pub status: String,
    /// `systemctl status` 输出
    pub info: String,
}

#[utoipa::path(
    get,
    path = "/status",
    summary = "frpc 运行状态",
    responses((status = 200, description = "running / stopped", body = StatusResponse)),
    tag = "Service"
)]
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: state.service.status().await,
    })
}

#[utoipa::path(
    get,
    path = "/logs",
    summary = "frpc 最近日志",
    responses(
        (status = 200, description = "journal 输出", body = LogsResponse),
        (status = 500, description = "读取失败", body = crate::error::ErrorResponse)
    ),
    tag = "Service"
)]
pub async fn get_logs(State(state): State<AppState>) -> Result<Json<LogsResponse>, AppError> {
    let logs = state
        .service
        .recent_logs(state.config.logs.lines)
        .await
        .map_err(|e| AppError::Environment(format!("获取日志失败: {e}")))?;
    Ok(Json(LogsResponse { logs }))
}

#[utoipa::path(
    get,
    path = "/service-status",
    summary = "systemd 服务详情",
    responses((status = 200, description = "状态文本与详细信息", body = ServiceStatusResponse)),
    tag = "Service"
)]
pub async fn get_service_status(State(state): State<AppState>) -> Json<ServiceStatusResponse> {
    let (status, info) = state.service.service_info().await;
    Json(ServiceStatusResponse { status, info })
}

pub fn create_service_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/logs", get(get_logs))
        .route("/service-status", get(get_service_status))
}
