// 测试辅助：在内存中构造 EPUB 文件

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const TOC_NCX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head></head>
  <docTitle><text>Fixture</text></docTitle>
  <navMap></navMap>
</ncx>"#;

struct FixtureItem {
    id: String,
    href: String,
    media_type: String,
    content: Option<Vec<u8>>,
}

/// EPUB 构造器
pub struct EpubBuilder {
    metadata: Vec<(String, String)>,
    items: Vec<FixtureItem>,
    spine: Vec<(String, bool)>,
}

impl EpubBuilder {
    pub fn new() -> Self {
        Self {
            metadata: Vec::new(),
            items: Vec::new(),
            spine: Vec::new(),
        }
    }

    fn meta(mut self, name: &str, value: &str) -> Self {
        self.metadata.push((name.to_string(), value.to_string()));
        self
    }

    pub fn title(self, value: &str) -> Self {
        self.meta("title", value)
    }

    pub fn creator(self, value: &str) -> Self {
        self.meta("creator", value)
    }

    pub fn language(self, value: &str) -> Self {
        self.meta("language", value)
    }

    pub fn identifier(self, value: &str) -> Self {
        self.meta("identifier", value)
    }

    pub fn publisher(self, value: &str) -> Self {
        self.meta("publisher", value)
    }

    /// 添加一个 XHTML 文档并放入 spine，`body` 为 <body> 内部的标记
    pub fn chapter(self, id: &str, href: &str, body: &str) -> Self {
        let document = xhtml_document(body);
        self.raw_chapter(id, href, document.into_bytes())
    }

    /// 添加任意字节内容的 XHTML 文档并放入 spine
    pub fn raw_chapter(mut self, id: &str, href: &str, content: Vec<u8>) -> Self {
        self.items.push(FixtureItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: "application/xhtml+xml".to_string(),
            content: Some(content),
        });
        self.spine.push((id.to_string(), true));
        self
    }

    /// 添加 manifest 条目（可选择是否写入 zip），不放入 spine
    pub fn item(mut self, id: &str, href: &str, media_type: &str, content: Option<&[u8]>) -> Self {
        self.items.push(FixtureItem {
            id: id.to_string(),
            href: href.to_string(),
            media_type: media_type.to_string(),
            content: content.map(|c| c.to_vec()),
        });
        self
    }

    /// 追加 spine 引用
    pub fn spine_ref(mut self, id: &str, linear: bool) -> Self {
        self.spine.push((id.to_string(), linear));
        self
    }

    fn opf(&self) -> String {
        let mut opf = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="bookid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
        );
        for (name, value) in &self.metadata {
            if name == "identifier" {
                opf.push_str(&format!("    <dc:identifier id=\"bookid\">{}</dc:identifier>\n", value));
            } else {
                opf.push_str(&format!("    <dc:{0}>{1}</dc:{0}>\n", name, value));
            }
        }
        opf.push_str("  </metadata>\n  <manifest>\n");
        opf.push_str("    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n");
        for item in &self.items {
            opf.push_str(&format!(
                "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"/>\n",
                item.id, item.href, item.media_type
            ));
        }
        opf.push_str("  </manifest>\n  <spine toc=\"ncx\">\n");
        for (id, linear) in &self.spine {
            if *linear {
                opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", id));
            } else {
                opf.push_str(&format!("    <itemref idref=\"{}\" linear=\"no\"/>\n", id));
            }
        }
        opf.push_str("  </spine>\n</package>\n");
        opf
    }

    /// 生成 EPUB 字节
    pub fn build(self) -> Vec<u8> {
        let opf = self.opf();
        let mut entries: Vec<(String, Vec<u8>)> = vec![
            ("mimetype".to_string(), b"application/epub+zip".to_vec()),
            ("META-INF/container.xml".to_string(), CONTAINER_XML.as_bytes().to_vec()),
            ("OEBPS/content.opf".to_string(), opf.into_bytes()),
            ("OEBPS/toc.ncx".to_string(), TOC_NCX.as_bytes().to_vec()),
        ];
        for item in self.items {
            if let Some(content) = item.content {
                entries.push((format!("OEBPS/{}", item.href), content));
            }
        }

        let borrowed: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
            .collect();
        Self::zip_with_entries(&borrowed)
    }

    /// 将给定条目打包为 zip
    pub fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, data) in entries {
            writer.start_file(*name, options).expect("start zip entry");
            writer.write_all(data).expect("write zip entry");
        }

        writer.finish().expect("finish zip").into_inner()
    }
}

/// 包装为完整的 XHTML 文档
pub fn xhtml_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Fixture Page</title></head>
<body>
{}
</body>
</html>"#,
        body
    )
}

/// 生成指定字符数的段落文本
pub fn prose(chars: usize) -> String {
    "a".repeat(chars)
}
