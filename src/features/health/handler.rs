use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::state::AppState;

/// 面板存活信息
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: &'static str,
    #[schema(example = "frpc-panel")]
    pub service: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// 被管理的 systemd 服务名
    #[schema(example = "frpc.service")]
    pub unit: String,
    /// 可执行文件是否就位；不查询 systemd
    pub frpc_installed: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "面板探活",
    description = "只检查面板进程本身与 frpc 可执行文件是否存在，不调用 systemctl。",
    responses((status = 200, description = "面板在运行", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        unit: state.config.paths.service_name.clone(),
        frpc_installed: state.installer.binary_exists().await,
    })
}
