use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::{
    handlers::{health_handler, parse_epub_handler},
    types::ApiState,
};
use crate::config::AppConfig;

/// 构建路由
///
/// 上传体积上限取自 `server.max_upload_bytes`，超出时返回 413
pub fn create_router(config: AppConfig) -> Router {
    let limit = config.server.max_upload_bytes;
    let state = ApiState {
        default_config: Arc::new(config),
    };

    Router::new()
        .route("/parse-epub", post(parse_epub_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(limit))
        .layer(RequestBodyLimitLayer::new(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 绑定监听地址
pub async fn bind(config: &AppConfig) -> std::io::Result<TcpListener> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    TcpListener::bind(&addr).await
}

/// 在给定的监听器上运行服务，直到进程退出
pub async fn serve(listener: TcpListener, config: AppConfig) -> std::io::Result<()> {
    let local: SocketAddr = listener.local_addr()?;
    tracing::info!("服务已启动: http://{}", local);

    let app = create_router(config);
    axum::serve(listener, app).await
}
