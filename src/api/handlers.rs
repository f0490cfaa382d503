use axum::{
    Json,
    extract::{Multipart, State},
};
use tracing::{debug, info};

use super::{
    error::ApiError,
    types::{ApiState, HealthResponse},
};
use crate::parser::{BookResponse, ensure_epub_file_name, epub_parser::EpubParser};

/// 上传的文件
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// 解析接口
///
/// POST /parse-epub
///
/// multipart 字段：
/// - `file`（或 `files`）：EPUB 文件，文件名必须以 `.epub` 结尾
/// - `config`（可选）：JSON 格式的解析选项，覆盖服务器默认值
///
/// 文件名在读取内容之前校验，不合法时直接返回 400。
pub async fn parse_epub_handler(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> Result<Json<BookResponse>, ApiError> {
    let mut upload = None;
    let mut options = state.default_config.extraction.clone();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" | "files" => {
                if upload.is_some() {
                    return Err(ApiError::bad_request("每次请求只能上传一个文件"));
                }
                let file_name = field.file_name().unwrap_or("").to_string();
                ensure_epub_file_name(&file_name)?;

                let bytes = field.bytes().await?;
                debug!(file_name = %file_name, size = bytes.len(), "收到上传文件");
                upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "config" => {
                let overrides = field.text().await?;
                options = options.with_overrides(&overrides)?;
            }
            other => {
                debug!(field = other, "忽略未知字段");
            }
        }
    }

    let Upload { file_name, bytes } = upload.ok_or_else(|| ApiError::bad_request("缺少 file 字段"))?;
    let include_skipped = options.include_skipped;
    let parser = EpubParser::new(options)?;

    // 解压和 HTML 解析是阻塞操作
    let result = tokio::task::spawn_blocking(move || parser.parse_bytes(&file_name, &bytes))
        .await
        .map_err(|e| ApiError::internal(format!("解析任务异常退出: {}", e)))??;

    info!(chapters = result.chapters.len(), "请求处理完成");
    Ok(Json(result.into_response(include_skipped)))
}

/// 健康检查
///
/// GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
