//! HTTP 接口
//!
//! - `POST /parse-epub`：multipart 上传 EPUB，返回元数据和章节
//! - `GET /health`：健康检查

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{bind, create_router, serve};
pub use types::{ApiState, ErrorResponse, HealthResponse};
