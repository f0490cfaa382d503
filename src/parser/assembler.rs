use super::*;
use crate::config::{ExtractionOptions, FilterPolicy, OutputMode};
use tracing::debug;

/// 尚未编号的章节
#[derive(Debug, Clone)]
pub struct ChapterDraft {
    pub spine_index: usize,
    pub item_id: String,
    pub raw_title: Option<String>,
    pub title: String,
    pub classification: Classification,
    pub body: ChapterBody,
}

/// 组装最终结果
///
/// 按 spine 顺序保留章节并连续编号：
/// - 文本模式下丢弃提取结果为空的章节，HTML 模式保留
/// - 严格过滤时丢弃 `isRealChapter = false` 的章节
/// - 只有开启 enrich 才附带分类信息
///
/// # 参数
/// - `metadata`: 书籍元数据
/// - `drafts`: 按 spine 顺序排列的章节草稿
/// - `skipped`: 遍历阶段跳过的条目
/// - `options`: 解析选项
///
/// # 返回
/// 解析结果
pub fn assemble(
    metadata: BookMetadata,
    drafts: Vec<ChapterDraft>,
    skipped: Vec<SkippedItem>,
    options: &ExtractionOptions,
) -> ParseResult {
    let mut chapters = Vec::with_capacity(drafts.len());

    for draft in drafts {
        if options.output_mode == OutputMode::Text && draft.body.as_str().trim().is_empty() {
            debug!(item_id = %draft.item_id, "正文为空，丢弃");
            continue;
        }
        if options.filter == FilterPolicy::Strict && !draft.classification.is_real_chapter {
            debug!(item_id = %draft.item_id, reason = %draft.classification.reason, "非正文章节，丢弃");
            continue;
        }

        let enrichment = options.enrich.then(|| ChapterEnrichment {
            raw_title: draft.raw_title,
            classification: draft.classification,
        });

        chapters.push(Chapter {
            id: draft.item_id,
            title: draft.title,
            order: chapters.len(),
            enrichment,
            body: draft.body,
            spine_index: draft.spine_index,
        });
    }

    ParseResult {
        metadata,
        chapters,
        skipped,
    }
}
