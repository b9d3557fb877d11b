use utoipa::openapi::server::ServerBuilder;
use utoipa::{Modify, OpenApi};

/// 业务接口挂载在 `/api` 下，`/health` 不带前缀。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("/api")
            .description(Some("面板接口"))
            .build();
        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（/health）"))
            .build();
        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::frpc_config::handler::get_config,
        crate::features::frpc_config::handler::save_config,
        crate::features::frpc_config::handler::check_config,
        crate::features::service::handler::get_status,
        crate::features::service::handler::get_logs,
        crate::features::service::handler::get_service_status,
        crate::features::release::handler::get_system_status,
        crate::features::release::handler::install_frpc,
        crate::features::release::handler::update_frpc,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::features::service::verifier::Verdict,
        crate::features::service::verifier::ConnectionStatus,
    )),
    modifiers(&ApiServers),
    tags(
        (name = "Config", description = "frpc 配置：读取、保存（自动备份并重启服务）、存在性检查。"),
        (name = "Service", description = "systemd 服务：运行状态、详细信息与日志。"),
        (name = "Release", description = "安装与更新：版本探测、下载、安装。"),
        (name = "Health", description = "健康检查：面板自身探活。"),
    ),
    info(
        title = "frpc Panel API",
        version = env!("CARGO_PKG_VERSION"),
        description = "frpc 本地管理面板（Axum + utoipa）。除 /health 外的接口挂载在 /api 下，paths 不包含该前缀。"
    )
)]
pub struct ApiDoc;
