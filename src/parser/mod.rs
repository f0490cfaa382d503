use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExtractError, Result};

// 子模块声明
pub mod archive;
pub mod assembler;
pub mod chapter_detector;
pub mod epub_parser;
pub mod spine_walker;
pub mod text_extractor;
pub mod title_extractor;

#[cfg(test)]
pub(crate) mod test_support;


/// 支持的文件扩展名
pub const SUPPORTED_EXTENSION: &str = "epub";

/// 书籍元数据
///
/// 取自 OPF 的 Dublin Core 块，重复字段只取第一个值。
/// 缺失字段序列化为 null，不会被填成空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub language: Option<String>,
    pub identifier: Option<String>,
    pub publisher: Option<String>,
}

/// Spine 条目
///
/// 序列顺序即为阅读顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineEntry {
    pub item_id: String,
    pub linear: bool,
}

/// Manifest 条目（不含内容，内容按需读取）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// 包内路径，如 `OEBPS/chapter1.xhtml`
    pub path: String,
    pub media_type: String,
}

impl ManifestItem {
    /// 文档的内部名称（路径的最后一段）
    pub fn name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| self.path.clone())
    }
}

/// 章节类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// 正文章节
    Chapter,
    /// 可能是正文
    Maybe,
    /// 前言/附属内容（封面、目录、版权页等）
    Frontmatter,
}

/// 章节分类结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub content_type: ContentType,
    pub is_real_chapter: bool,
    pub score: f64,
    pub reason: String,
}

/// 章节正文：纯文本或原始 HTML
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterBody {
    Text(String),
    Html(String),
}

impl ChapterBody {
    pub fn as_str(&self) -> &str {
        match self {
            ChapterBody::Text(s) | ChapterBody::Html(s) => s,
        }
    }
}

/// 附加的分类信息，仅在 enrich 模式下输出
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterEnrichment {
    /// 文档中找到的标题原文，没有标题时为 null
    pub raw_title: Option<String>,
    #[serde(flatten)]
    pub classification: Classification,
}

/// 输出章节
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// manifest 条目 ID
    pub id: String,
    pub title: String,
    /// 在保留章节中的位置（从 0 开始连续编号）
    pub order: usize,
    #[serde(flatten)]
    pub enrichment: Option<ChapterEnrichment>,
    #[serde(flatten)]
    pub body: ChapterBody,
    /// 在 spine 中的原始位置，仅用于诊断
    #[serde(skip)]
    pub spine_index: usize,
}

/// 被跳过的 spine 条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub item_id: String,
    pub spine_index: usize,
    pub reason: String,
}

/// 解析结果
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
    pub skipped: Vec<SkippedItem>,
}

/// 响应体
#[derive(Debug, Clone, Serialize)]
pub struct BookResponse {
    pub metadata: BookMetadata,
    pub chapters: Vec<Chapter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<Vec<SkippedItem>>,
}

impl ParseResult {
    /// 转换为响应体
    ///
    /// # 参数
    /// - `include_skipped`: 是否附带被跳过的条目
    pub fn into_response(self, include_skipped: bool) -> BookResponse {
        BookResponse {
            metadata: self.metadata,
            chapters: self.chapters,
            skipped: include_skipped.then_some(self.skipped),
        }
    }
}

/// 检查上传文件名是否为 EPUB
///
/// 在解析之前调用，不符合时直接作为客户端错误返回
pub fn ensure_epub_file_name(file_name: &str) -> Result<()> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    match ext {
        Some(ext) if ext == SUPPORTED_EXTENSION => Ok(()),
        _ => Err(ExtractError::UnsupportedFile(format!(
            "文件必须是 .epub 格式: {}",
            if file_name.is_empty() { "<未命名>" } else { file_name }
        ))),
    }
}
