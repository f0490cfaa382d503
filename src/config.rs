//! 配置加载
//!
//! 所有可调整的参数集中在这里，从 TOML 文件读取。缺失的字段使用默认值，
//! 请求级覆盖（multipart 的 `config` 字段）在服务器默认配置之上合并。

use crate::error::{ExtractError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "CHAPTER_READER_CONFIG";
/// 默认配置文件位置
pub const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";

/// 章节正文的输出形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// 纯文本
    #[default]
    Text,
    /// 原始 HTML
    Html,
}

/// 纯文本的排版方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextLayout {
    /// 压平为一段，空白折叠为单个空格
    #[default]
    Flatten,
    /// 仅保留 <p> 段落，以空行连接
    Paragraphs,
}

/// 章节分类结果的使用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// 只标注，交给调用方过滤
    #[default]
    Annotate,
    /// 丢弃 isRealChapter = false 的章节
    Strict,
}

/// 顶层配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extraction: ExtractionOptions,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            extraction: ExtractionOptions::default(),
            log_level: default_log_level(),
        }
    }
}

/// HTTP 服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// 单次解析的选项
///
/// 既是服务器默认值，也可以被单个请求覆盖
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    #[serde(default)]
    pub output_mode: OutputMode,
    #[serde(default)]
    pub text_layout: TextLayout,
    /// 是否输出 rawTitle / contentType / isRealChapter / score / reason
    #[serde(default = "default_true")]
    pub enrich: bool,
    #[serde(default)]
    pub filter: FilterPolicy,
    #[serde(default)]
    pub skip_non_linear: bool,
    /// 是否在响应中附带被跳过的条目
    #[serde(default)]
    pub include_skipped: bool,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::default(),
            text_layout: TextLayout::default(),
            enrich: true,
            filter: FilterPolicy::default(),
            skip_non_linear: false,
            include_skipped: false,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ExtractionOptions {
    /// 检查选项是否自洽
    pub fn validate(&self) -> Result<()> {
        self.classifier.validate()
    }

    /// 在当前选项之上合并请求级覆盖
    ///
    /// # 参数
    /// - `overrides`: JSON 对象，只需包含要修改的字段
    ///
    /// # 返回
    /// 合并并校验后的新选项
    pub fn with_overrides(&self, overrides: &str) -> Result<Self> {
        let patch: serde_json::Value = serde_json::from_str(overrides)
            .map_err(|e| ExtractError::Config(format!("无效的请求配置: {}", e)))?;
        if !patch.is_object() {
            return Err(ExtractError::Config("请求配置必须是 JSON 对象".to_string()));
        }

        let mut base = serde_json::to_value(self)?;
        merge_json(&mut base, patch);

        let merged: ExtractionOptions = serde_json::from_value(base)
            .map_err(|e| ExtractError::Config(format!("无效的请求配置: {}", e)))?;
        merged.validate()?;
        Ok(merged)
    }
}

fn merge_json(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

/// 章节分类阈值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_chapter_min_chars")]
    pub chapter_min_chars: usize,
    #[serde(default = "default_maybe_min_chars")]
    pub maybe_min_chars: usize,
    #[serde(default = "default_frontmatter_markers")]
    pub frontmatter_markers: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            chapter_min_chars: default_chapter_min_chars(),
            maybe_min_chars: default_maybe_min_chars(),
            frontmatter_markers: default_frontmatter_markers(),
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.maybe_min_chars > self.chapter_min_chars {
            return Err(ExtractError::Config(format!(
                "maybe_min_chars ({}) 不能大于 chapter_min_chars ({})",
                self.maybe_min_chars, self.chapter_min_chars
            )));
        }
        if self.frontmatter_markers.iter().any(|m| m.trim().is_empty()) {
            return Err(ExtractError::Config("frontmatter_markers 不能包含空字符串".to_string()));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chapter_min_chars() -> usize {
    1500
}

fn default_maybe_min_chars() -> usize {
    600
}

fn default_frontmatter_markers() -> Vec<String> {
    ["toc", "contents", "index", "copyright", "titlepage", "cover"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

impl AppConfig {
    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: AppConfig =
            toml::from_str(data).map_err(|e| ExtractError::Config(format!("TOML 解析失败: {}", e)))?;
        config.extraction.validate()?;
        Ok(config)
    }

    /// 加载配置
    ///
    /// 查找顺序：显式路径 → 环境变量 → `conf/config.toml` → 默认值。
    /// 显式指定的文件不存在时报错，默认位置不存在则静默使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var(CONFIG_ENV).ok().map(PathBuf::from),
        };

        if let Some(path) = path {
            let data = fs::read_to_string(&path).map_err(|e| {
                ExtractError::Config(format!("读取配置文件 {} 失败: {}", path.display(), e))
            })?;
            let config = Self::from_toml_str(&data)?;
            info!(path = %path.display(), "已加载配置文件");
            return Ok(config);
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            let data = fs::read_to_string(default_path).map_err(|e| {
                ExtractError::Config(format!("读取配置文件 {} 失败: {}", DEFAULT_CONFIG_PATH, e))
            })?;
            let config = Self::from_toml_str(&data)?;
            info!(path = DEFAULT_CONFIG_PATH, "已加载配置文件");
            return Ok(config);
        }

        debug!("未找到配置文件，使用默认配置");
        Ok(Self::default())
    }
}
