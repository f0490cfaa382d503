//! EPUB 章节提取
//!
//! 上传一本 EPUB，按 spine 阅读顺序返回元数据和逐章的正文，
//! 并给每一章附上"是否为正文章节"的分类。

pub mod api;
pub mod config;
pub mod error;
pub mod parser;

pub use config::{AppConfig, ClassifierConfig, ExtractionOptions, FilterPolicy, OutputMode, TextLayout};
pub use error::{ExtractError, Result, SkipReason};
pub use parser::epub_parser::EpubParser;
pub use parser::{BookMetadata, BookResponse, Chapter, ChapterBody, Classification, ContentType, ParseResult};
