use super::*;
use crate::config::ClassifierConfig;

/// 章节分类器
///
/// 输入文档名和压平后的纯文本，输出分类结果。实现必须是纯函数。
pub trait ChapterClassifier: Send + Sync {
    fn classify(&self, name: &str, text: &str) -> Classification;
}

/// 默认章节检测器
///
/// 两步判定：
/// 1. 文件名提示：名称包含目录、版权页、封面等标记时直接判为前言
/// 2. 长度判定：按字符数划分为正文、可能正文、前言
pub struct ChapterDetector {
    /// 小写化后的文件名标记
    markers: Vec<String>,
    chapter_min_chars: usize,
    maybe_min_chars: usize,
}

impl ChapterDetector {
    /// 创建新的章节检测器实例
    ///
    /// # 参数
    /// - `config`: 分类阈值与文件名标记
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            markers: config
                .frontmatter_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
            chapter_min_chars: config.chapter_min_chars,
            maybe_min_chars: config.maybe_min_chars,
        }
    }

    /// 第一步：文件名提示
    fn matches_marker(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.markers.iter().any(|marker| lower.contains(marker.as_str()))
    }

    /// 第二步：按字符数判定
    ///
    /// 字符数按 Unicode 标量计算，不是字节数
    fn classify_by_length(&self, chars: usize) -> Classification {
        let (content_type, is_real_chapter, score) = if chars >= self.chapter_min_chars {
            (ContentType::Chapter, true, 1.0)
        } else if chars >= self.maybe_min_chars {
            (ContentType::Maybe, true, 0.6)
        } else {
            (ContentType::Frontmatter, false, 0.2)
        };

        Classification {
            content_type,
            is_real_chapter,
            score,
            reason: format!("length={}", chars),
        }
    }
}

impl Default for ChapterDetector {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl ChapterClassifier for ChapterDetector {
    fn classify(&self, name: &str, text: &str) -> Classification {
        if self.matches_marker(name) {
            return Classification {
                content_type: ContentType::Frontmatter,
                is_real_chapter: false,
                score: 0.0,
                reason: "filename_hint".to_string(),
            };
        }

        self.classify_by_length(text.chars().count())
    }
}
