use axum::{Router, routing::get};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::features::{frpc_config, health, release, service};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整路由：`/api/*` 业务接口、`/health`、`/docs`，以及可选的前端静态目录
pub fn build_app(state: AppState) -> Router {
    let api_router = Router::<AppState>::new()
        .merge(frpc_config::create_config_router())
        .merge(service::create_service_router())
        .merge(release::create_release_router());

    let mut app = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_router)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    if let Some(web_dir) = state.config.ui.web_dir.clone() {
        tracing::info!("静态页面目录: {:?}", web_dir);
        let favicon = web_dir.join("favicon.svg");
        app = app
            .nest_service("/static", ServeDir::new(&web_dir))
            .route_service("/favicon.ico", ServeFile::new(&favicon))
            .route_service("/favicon.svg", ServeFile::new(&favicon))
            .route_service("/", ServeFile::new(web_dir.join("index.html")));
    }

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
