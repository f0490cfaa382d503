use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AppConfig;

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误类型名称
    pub error_type: String,
    /// 可读的错误原因
    pub message: String,
    pub status_code: u16,
}

/// 服务器状态
///
/// 服务器默认配置只读共享，单个请求在其副本上合并覆盖
#[derive(Debug, Clone)]
pub struct ApiState {
    pub default_config: Arc<AppConfig>,
}
