use scraper::{Html, Selector};

use super::text_extractor::collapse_whitespace;

/// 标题查找顺序：先一级标题，再二级标题
const HEADING_TAGS: &[&str] = &["h1", "h2"];

/// 从 HTML 内容中查找章节标题
///
/// 按 h1、h2 的优先级返回第一个非空标题的文字。
/// 标题内部的连续空白（包括换行）也折叠为单个空格，
/// 例如 `<h1>Chapter\n   One</h1>` 得到 `Chapter One`。
pub fn find_heading(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for tag in HEADING_TAGS {
        if let Ok(selector) = Selector::parse(tag) {
            if let Some(element) = document.select(&selector).next() {
                let text = collapse_whitespace(&element.text().collect::<String>());
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }

    None
}

/// 提取显示用标题
///
/// # 参数
/// - `html`: 文档标记
/// - `fallback`: 找不到标题时使用的名称（通常是 manifest 中的文件名）
///
/// # 返回
/// 标题文字或原样返回的 fallback
pub fn extract_title(html: &str, fallback: &str) -> String {
    find_heading(html).unwrap_or_else(|| fallback.to_string())
}
