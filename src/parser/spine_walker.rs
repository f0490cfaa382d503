//! Spine 遍历
//!
//! 按阅读顺序逐个解析 spine 条目。每个条目要么得到解码后的内容，
//! 要么得到一个跳过原因；单个条目的失败不会中断遍历。

use super::archive::OpenedBook;
use crate::error::SkipReason;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// 视为内容文档的 media-type
const CONTENT_MEDIA_TYPES: &[&str] = &["application/xhtml+xml", "text/html"];

/// 解析成功的 spine 条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub spine_index: usize,
    pub item_id: String,
    /// 内部文件名，用于分类和标题回退
    pub name: String,
    pub path: String,
    pub media_type: String,
    /// 解码后的文档标记
    pub content: String,
}

/// 单个 spine 条目的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    pub spine_index: usize,
    pub item_id: String,
    pub result: Result<ResolvedItem, SkipReason>,
}

/// Spine 迭代器
pub struct SpineWalker<'a> {
    book: &'a mut OpenedBook,
    next_index: usize,
    skip_non_linear: bool,
}

impl<'a> SpineWalker<'a> {
    /// # 参数
    /// - `book`: 已打开的书籍
    /// - `skip_non_linear`: 是否跳过 `linear="no"` 的条目
    pub fn new(book: &'a mut OpenedBook, skip_non_linear: bool) -> Self {
        Self {
            book,
            next_index: 0,
            skip_non_linear,
        }
    }

    fn resolve(&mut self, spine_index: usize, item_id: &str, linear: bool) -> Result<ResolvedItem, SkipReason> {
        if self.skip_non_linear && !linear {
            return Err(SkipReason::NonLinear);
        }

        let item = self
            .book
            .manifest_item(item_id)
            .ok_or_else(|| SkipReason::MissingManifestItem(item_id.to_string()))?;

        if !is_content_document(&item.media_type) {
            return Err(SkipReason::NotContentDocument(item.media_type));
        }

        let bytes = self
            .book
            .read_item(item_id)
            .ok_or_else(|| SkipReason::ContentUnavailable(item.path.clone()))?;

        let content = decode_content(&bytes)?;

        Ok(ResolvedItem {
            spine_index,
            item_id: item_id.to_string(),
            name: item.name(),
            path: item.path,
            media_type: item.media_type,
            content,
        })
    }
}

impl Iterator for SpineWalker<'_> {
    type Item = WalkOutcome;

    fn next(&mut self) -> Option<Self::Item> {
        let spine_index = self.next_index;
        let entry = self.book.spine.get(spine_index)?.clone();
        self.next_index += 1;

        let result = self.resolve(spine_index, &entry.item_id, entry.linear);
        match &result {
            Ok(item) => debug!(spine_index, item_id = %entry.item_id, path = %item.path, "已读取内容文档"),
            Err(reason) => warn!(spine_index, item_id = %entry.item_id, %reason, "跳过 spine 条目"),
        }

        Some(WalkOutcome {
            spine_index,
            item_id: entry.item_id,
            result,
        })
    }
}

/// 是否为 XHTML/HTML 内容文档
///
/// 忽略大小写和 `; charset=...` 之类的参数
pub fn is_content_document(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    CONTENT_MEDIA_TYPES.contains(&essence.as_str())
}

/// 解码文档字节
///
/// 有 BOM 时按 BOM 指示的编码解码，否则严格按 UTF-8 解码。
/// 出现无法解码的字节时返回 `UndecodableContent`，不做替换。
pub fn decode_content(bytes: &[u8]) -> Result<String, SkipReason> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(SkipReason::UndecodableContent(format!(
                "{} 编码中存在非法字节",
                encoding.name()
            )));
        }
        return Ok(text.into_owned());
    }

    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| SkipReason::UndecodableContent("不是有效的 UTF-8".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::archive;
    use crate::parser::test_support::EpubBuilder;

    fn walk(bytes: &[u8], skip_non_linear: bool) -> Vec<WalkOutcome> {
        let mut book = archive::load(bytes).unwrap();
        SpineWalker::new(&mut book, skip_non_linear).collect()
    }

    #[test]
    fn test_content_media_types() {
        assert!(is_content_document("application/xhtml+xml"));
        assert!(is_content_document("text/html"));
        assert!(is_content_document("Text/HTML; charset=utf-8"));
        assert!(!is_content_document("image/jpeg"));
        assert!(!is_content_document("text/css"));
        assert!(!is_content_document(""));
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode_content("第一章".as_bytes()).unwrap(), "第一章");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"<p>x</p>");
        assert_eq!(decode_content(&bytes).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_decode_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<p>章</p>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_content(&bytes).unwrap(), "<p>章</p>");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let result = decode_content(&[0x3C, 0x70, 0x3E, 0xC3, 0x28, 0xA0, 0xA1]);
        assert!(matches!(result, Err(SkipReason::UndecodableContent(_))));
    }

    #[test]
    fn test_walk_in_spine_order() {
        let bytes = EpubBuilder::new()
            .chapter("b", "b.xhtml", "<p>B</p>")
            .chapter("a", "a.xhtml", "<p>A</p>")
            .build();

        let outcomes = walk(&bytes, false);
        let ids: Vec<_> = outcomes.iter().map(|o| o.item_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let first = outcomes[0].result.as_ref().unwrap();
        assert_eq!(first.spine_index, 0);
        assert_eq!(first.name, "b.xhtml");
        assert!(first.content.contains("<p>B</p>"));
    }

    #[test]
    fn test_walk_records_skip_reasons() {
        let bytes = EpubBuilder::new()
            .chapter("c1", "c1.xhtml", "<p>one</p>")
            .item("img", "cover.jpg", "image/jpeg", Some(b"\xFF\xD8\xFF".as_slice()))
            .spine_ref("img", true)
            .spine_ref("ghost", true)
            .item("lost", "lost.xhtml", "application/xhtml+xml", None)
            .spine_ref("lost", true)
            .build();

        let outcomes = walk(&bytes, false);
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].result.is_ok());
        assert_eq!(
            outcomes[1].result,
            Err(SkipReason::NotContentDocument("image/jpeg".to_string()))
        );
        assert_eq!(
            outcomes[2].result,
            Err(SkipReason::MissingManifestItem("ghost".to_string()))
        );
        assert!(matches!(outcomes[3].result, Err(SkipReason::ContentUnavailable(_))));
        assert_eq!(outcomes[3].spine_index, 3);
    }

    #[test]
    fn test_non_linear_handling() {
        let bytes = EpubBuilder::new()
            .chapter("c1", "c1.xhtml", "<p>one</p>")
            .item("notes", "notes.xhtml", "application/xhtml+xml", Some(b"<p>n</p>".as_slice()))
            .spine_ref("notes", false)
            .build();

        let kept = walk(&bytes, false);
        assert!(kept[1].result.is_ok());

        let skipped = walk(&bytes, true);
        assert_eq!(skipped[1].result, Err(SkipReason::NonLinear));
        assert!(skipped[0].result.is_ok());
    }
}
