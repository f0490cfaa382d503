use super::*;
use super::archive;
use super::assembler::{assemble, ChapterDraft};
use super::chapter_detector::{ChapterClassifier, ChapterDetector};
use super::spine_walker::{ResolvedItem, SpineWalker};
use super::text_extractor::{extract_paragraphs, extract_text};
use super::title_extractor::find_heading;
use crate::config::{ExtractionOptions, OutputMode, TextLayout};
use tracing::{debug, info};

/// EPUB 解析器
///
/// 接收上传的字节，按 spine 顺序输出章节
pub struct EpubParser {
    options: ExtractionOptions,
    classifier: Box<dyn ChapterClassifier>,
}

impl EpubParser {
    /// 创建新的 EPUB 解析器实例
    ///
    /// 使用配置中的阈值构造默认的章节检测器，选项不合法时返回 `Config` 错误
    pub fn new(options: ExtractionOptions) -> Result<Self> {
        options.validate()?;
        let classifier = Box::new(ChapterDetector::new(&options.classifier));
        Ok(Self { options, classifier })
    }

    /// 替换章节分类器
    pub fn with_classifier(mut self, classifier: Box<dyn ChapterClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// 解析 EPUB
    ///
    /// # 参数
    /// - `file_name`: 上传时的文件名，只用于扩展名校验
    /// - `bytes`: 文件内容
    ///
    /// # 返回
    /// 元数据、章节列表和被跳过的条目。
    /// 只有文件名不合法或归档无法打开时才返回错误，单个章节的问题只会记入 `skipped`。
    pub fn parse_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<ParseResult> {
        ensure_epub_file_name(file_name)?;
        info!(file_name, size = bytes.len(), "开始解析 EPUB");

        let mut book = archive::load(bytes)?;
        let metadata = book.metadata.clone();

        let mut drafts = Vec::new();
        let mut skipped = Vec::new();

        for outcome in SpineWalker::new(&mut book, self.options.skip_non_linear) {
            match outcome.result {
                Ok(item) => drafts.push(self.build_draft(item)),
                Err(reason) => skipped.push(SkippedItem {
                    item_id: outcome.item_id,
                    spine_index: outcome.spine_index,
                    reason: reason.to_string(),
                }),
            }
        }
        // 提前关闭归档并删除临时文件
        drop(book);

        let result = assemble(metadata, drafts, skipped, &self.options);
        info!(
            file_name,
            chapters = result.chapters.len(),
            skipped = result.skipped.len(),
            "EPUB 解析完成"
        );
        Ok(result)
    }

    /// 处理单个内容文档
    fn build_draft(&self, item: ResolvedItem) -> ChapterDraft {
        let flat_text = extract_text(&item.content);
        let classification = self.classifier.classify(&item.name, &flat_text);

        let raw_title = find_heading(&item.content);
        let title = raw_title.clone().unwrap_or_else(|| item.name.clone());

        debug!(
            item_id = %item.item_id,
            title = %title,
            content_type = ?classification.content_type,
            reason = %classification.reason,
            "章节已分类"
        );

        let body = match (self.options.output_mode, self.options.text_layout) {
            (OutputMode::Html, _) => ChapterBody::Html(item.content),
            (OutputMode::Text, TextLayout::Flatten) => ChapterBody::Text(flat_text),
            (OutputMode::Text, TextLayout::Paragraphs) => ChapterBody::Text(extract_paragraphs(&item.content)),
        };

        ChapterDraft {
            spine_index: item.spine_index,
            item_id: item.item_id,
            raw_title,
            title,
            classification,
            body,
        }
    }
}
