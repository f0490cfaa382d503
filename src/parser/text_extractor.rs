use scraper::{ElementRef, Html, Selector};

/// 永远不属于正文的元素
const SKIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer"];

/// 块级元素，结束时补一个空格，避免相邻块的文字粘连
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "aside", "blockquote", "li", "ul", "ol", "dl", "dt", "dd",
    "h1", "h2", "h3", "h4", "h5", "h6", "pre", "table", "tr", "td", "th", "br", "hr", "figure",
    "figcaption",
];

/// 提取压平后的纯文本
///
/// 去掉 script/style/nav/header/footer，拼接 body 内其余文本节点，
/// 连续空白（含换行）折叠为单个空格，首尾去空白。
///
/// html5ever 对任何输入都会恢复出一棵树，因此这里不会失败；
/// 找不到 body 时返回空字符串。
///
/// 输出中的实体会被解码（`&lt;` 变成 `<`，`&amp;amp;` 变成 `&amp;`）。
/// 对输出再提取一次只在其中不含 `<` 和 `&` 时保持不变，
/// 否则会被重新当作标记解析。
///
/// # 参数
/// - `html`: 文档标记
///
/// # 返回
/// 纯文本
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = match body_element(&document) {
        Some(body) => body,
        None => return String::new(),
    };

    let mut raw = String::new();
    collect_text(&body, &mut raw);
    collapse_whitespace(&raw)
}

/// 提取段落文本
///
/// 仅保留 <p> 元素的文字，每段内部折叠空白，段与段之间以空行连接。
/// 位于被跳过元素（如 nav）内部的段落不计入。
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("p") {
        Ok(selector) => selector,
        Err(_) => return String::new(),
    };

    document
        .select(&selector)
        .filter(|p| !inside_skipped(p))
        .map(|p| {
            let mut raw = String::new();
            collect_text(&p, &mut raw);
            collapse_whitespace(&raw)
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// 折叠空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn body_element(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse("body").ok()?;
    document.select(&selector).next()
}

fn collect_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            collect_text(&child_element, out);
            if BLOCK_TAGS.contains(&name) {
                out.push(' ');
            }
        }
    }
}

fn inside_skipped(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| SKIPPED_TAGS.contains(&ancestor.value().name()))
}
