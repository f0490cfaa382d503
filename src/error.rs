use thiserror::Error;

/// 请求级错误
///
/// 这些错误会导致整个请求失败，不返回任何部分结果。
/// 单个章节的失败使用 [`SkipReason`] 表示，不会出现在这里。
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("不支持的文件: {0}")]
    UnsupportedFile(String),
    #[error("无效的 EPUB 文件: {0}")]
    InvalidArchive(String),
    #[error("临时文件错误: {0}")]
    Staging(#[from] std::io::Error),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// 是否属于调用方的问题（对应 HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExtractError::UnsupportedFile(_) | ExtractError::InvalidArchive(_) | ExtractError::Config(_)
        )
    }

    /// 错误类型名称，用于 API 错误响应
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::UnsupportedFile(_) => "UnsupportedFile",
            ExtractError::InvalidArchive(_) => "InvalidArchive",
            ExtractError::Staging(_) => "Staging",
            ExtractError::Config(_) => "Config",
            ExtractError::Serialization(_) => "Serialization",
        }
    }
}

/// 单个 spine 条目被跳过的原因
///
/// 可恢复错误：记录后继续处理下一个条目
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("manifest 中不存在条目 {0}")]
    MissingManifestItem(String),
    #[error("不是内容文档 (media-type: {0})")]
    NotContentDocument(String),
    #[error("无法读取内容: {0}")]
    ContentUnavailable(String),
    #[error("内容无法解码: {0}")]
    UndecodableContent(String),
    #[error("非线性条目")]
    NonLinear,
}

pub type Result<T> = std::result::Result<T, ExtractError>;
