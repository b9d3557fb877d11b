use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::frpc_config::store::ConfigStoreError;
use crate::features::release::fetcher::FetchError;
use crate::features::release::installer::InstallError;
use crate::system::ServiceError;

/// 应用统一错误类型
///
/// 各层返回带类型的失败原因，handler 统一转换为 HTTP 状态码与 `{ "error": ... }`。
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体无效
    #[error("{0}")]
    BadRequest(String),

    /// 运行环境问题（目录、可执行文件、服务管理器缺失等）
    #[error("{0}")]
    Environment(String),

    /// 全部下载源失败
    #[error("{0}")]
    Network(String),

    /// 下载的制品无效
    #[error("{0}")]
    InvalidArtifact(String),

    /// 服务启动或重启失败
    #[error("{0}")]
    Service(String),

    /// 内部错误
    #[error("{0}")]
    Internal(String),
}

/// 错误响应体
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// 人类可读的错误信息
    #[schema(example = "保存配置失败: 写入配置文件失败")]
    pub error: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Environment(_)
            | AppError::Network(_)
            | AppError::InvalidArtifact(_)
            | AppError::Service(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 为错误信息加上面向用户的前缀，保留原有分类
    pub fn context(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{prefix}: {msg}");
        match self {
            AppError::BadRequest(m) => AppError::BadRequest(wrap(m)),
            AppError::Environment(m) => AppError::Environment(wrap(m)),
            AppError::Network(m) => AppError::Network(wrap(m)),
            AppError::InvalidArtifact(m) => AppError::InvalidArtifact(wrap(m)),
            AppError::Service(m) => AppError::Service(wrap(m)),
            AppError::Internal(m) => AppError::Internal(wrap(m)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = crate::request_id::current_request_id().unwrap_or_default();
        if status.is_server_error() {
            tracing::error!(request_id = %request_id, "请求处理失败: {}", self);
        } else {
            tracing::warn!(request_id = %request_id, "请求被拒绝: {}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

// =============== 各层错误到 AppError 的转换 ===============

impl From<ConfigStoreError> for AppError {
    fn from(err: ConfigStoreError) -> Self {
        match err {
            ConfigStoreError::Serialize(_) => AppError::Internal(err.to_string()),
            _ => AppError::Environment(err.to_string()),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::AllSourcesFailed { .. } => AppError::Network(err.to_string()),
            _ => AppError::Internal(err.to_string()),
        }
    }
}

impl From<InstallError> for AppError {
    fn from(err: InstallError) -> Self {
        match err {
            InstallError::InvalidArtifact(_) => AppError::InvalidArtifact(err.to_string()),
            InstallError::MissingBinary(_) => AppError::InvalidArtifact(err.to_string()),
            _ => AppError::Environment(err.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::StartFailed(_) => AppError::Service(err.to_string()),
            _ => AppError::Environment(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bad_request_renders_error_envelope() {
        let resp = AppError::BadRequest("无效的配置数据: missing field".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], "无效的配置数据: missing field");
        assert_eq!(v.as_object().unwrap().len(), 1);
    }

    #[test]
    fn context_keeps_category() {
        let err = AppError::Service("服务启动失败: failed".into()).context("重启服务失败");
        assert!(matches!(err, AppError::Service(_)));
        assert_eq!(err.to_string(), "重启服务失败: 服务启动失败: failed");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn service_start_failure_maps_to_service_error() {
        let err: AppError = ServiceError::StartFailed("failed".into()).into();
        assert!(matches!(err, AppError::Service(_)));
    }
}
