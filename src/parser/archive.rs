//! 归档加载
//!
//! 上传的字节先写入唯一命名的临时文件，再交给 `epub` 打开。
//! 临时文件由 [`StagedArchive`] 持有，离开作用域时删除，成功和失败路径都一样。

use super::*;
use epub::doc::EpubDoc;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// 落盘后的上传文件
pub struct StagedArchive {
    file: NamedTempFile,
}

impl StagedArchive {
    /// 将字节写入临时文件
    ///
    /// # 参数
    /// - `bytes`: 上传的 EPUB 字节
    ///
    /// # 返回
    /// 持有临时文件的句柄，Drop 时删除文件
    pub fn stage(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("chapter-reader-")
            .suffix(".epub")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!(path = %file.path().display(), size = bytes.len(), "上传文件已落盘");
        Ok(Self { file })
    }

    /// 临时文件路径
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// 已打开的书籍
///
/// 字段按声明顺序析构：先关闭 `doc` 的文件句柄，再删除临时文件。
pub struct OpenedBook {
    doc: EpubDoc<BufReader<File>>,
    pub metadata: BookMetadata,
    pub spine: Vec<SpineEntry>,
    _staged: StagedArchive,
}

impl OpenedBook {
    /// 打开已落盘的 EPUB
    ///
    /// 无法打开（不是 zip、缺少 container.xml、OPF 无法解析、manifest 为空）时
    /// 返回 `InvalidArchive`。
    pub fn open(staged: StagedArchive) -> Result<Self> {
        let doc = EpubDoc::new(staged.path())
            .map_err(|e| ExtractError::InvalidArchive(format!("EPUB 解析错误: {}", e)))?;

        if doc.resources.is_empty() {
            return Err(ExtractError::InvalidArchive("缺少 manifest".to_string()));
        }

        let metadata = read_metadata(&doc);
        let spine = doc
            .spine
            .iter()
            .map(|item| SpineEntry {
                item_id: item.idref.clone(),
                linear: item.linear,
            })
            .collect::<Vec<_>>();

        info!(
            title = metadata.title.as_deref().unwrap_or("<无标题>"),
            spine_len = spine.len(),
            manifest_len = doc.resources.len(),
            "EPUB 已打开"
        );

        Ok(Self {
            doc,
            metadata,
            spine,
            _staged: staged,
        })
    }

    /// 按 ID 查找 manifest 条目
    pub fn manifest_item(&self, id: &str) -> Option<ManifestItem> {
        self.doc.resources.get(id).map(|resource| ManifestItem {
            id: id.to_string(),
            path: resource.path.to_string_lossy().replace('\\', "/"),
            media_type: resource.mime.clone(),
        })
    }

    /// 读取条目的原始字节
    pub fn read_item(&mut self, id: &str) -> Option<Vec<u8>> {
        self.doc.get_resource(id).map(|(bytes, _mime)| bytes)
    }
}

/// 一次性完成落盘和打开
pub fn load(bytes: &[u8]) -> Result<OpenedBook> {
    let staged = StagedArchive::stage(bytes)?;
    OpenedBook::open(staged)
}

fn read_metadata<R: std::io::Read + std::io::Seek>(doc: &EpubDoc<R>) -> BookMetadata {
    // mdata 返回同名字段中的第一条
    let field = |name: &str| {
        doc.mdata(name)
            .map(|item| item.value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    BookMetadata {
        title: field("title"),
        creator: field("creator"),
        language: field("language"),
        identifier: field("identifier"),
        publisher: field("publisher"),
    }
}
