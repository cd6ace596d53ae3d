//! KBP 文档模型。
//!
//! 解析器产出的结构化表示。一个 [`KbpFile`] 聚合了调色板、样式集合、
//! 页边距、杂项配置、轨道信息以及有序的页面和图片块，解析成功后不再变化。

mod style;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use style::{KbpColor, KbpPalette, KbpStyle, KbpStyleBuilder, KbpStyleCollection, PALETTE_SIZE};

use crate::config::TextExtractionOptions;

/// 歌词行的头部：对齐方式、样式字母与时间、位置信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpLineHeader {
    /// 对齐方式（`L`/`C`/`R`）。
    pub align: char,
    /// 样式字母别名。大写为普通样式，小写为固定样式。
    pub style_letter: char,
    /// 开始时间（厘秒）。
    pub start: i64,
    /// 结束时间（厘秒）。
    pub end: i64,
    /// 水平偏移。
    pub right: i32,
    /// 垂直偏移。
    pub down: i32,
    /// 旋转角度。
    pub rotation: i32,
}

impl KbpLineHeader {
    /// 该行是否使用固定（无擦除）样式。
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.style_letter.is_ascii_lowercase()
    }
}

/// 歌词行中的一个音节。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpSyllable {
    /// 音节文本。
    pub text: String,
    /// 开始时间（厘秒）。
    pub start: i64,
    /// 结束时间（厘秒）。
    pub end: i64,
    /// 擦除方式编号。
    pub wipe: i32,
}

impl KbpSyllable {
    /// 音节文本是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// 一行歌词：头部加按声明顺序排列的音节。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpLine {
    /// 行头。
    pub header: KbpLineHeader,
    /// 音节列表，保持文件中的声明顺序。
    pub syllables: Vec<KbpSyllable>,
}

impl KbpLine {
    /// 行的开始时间（厘秒）。
    #[must_use]
    pub const fn start(&self) -> i64 {
        self.header.start
    }

    /// 行的结束时间（厘秒）。
    #[must_use]
    pub const fn end(&self) -> i64 {
        self.header.end
    }

    /// 行的对齐方式。
    #[must_use]
    pub const fn align(&self) -> char {
        self.header.align
    }

    /// 行使用的样式字母。
    #[must_use]
    pub const fn style_letter(&self) -> char {
        self.header.style_letter
    }

    /// 该行是否使用固定（无擦除）样式。
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.header.is_fixed()
    }

    /// 行是否为空：没有音节，或只有一个空文本音节。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.syllables.is_empty()
            || (self.syllables.len() == 1 && self.syllables[0].is_empty())
    }

    /// 拼接所有音节文本。
    #[must_use]
    pub fn text(&self) -> String {
        self.syllables.iter().map(|s| s.text.as_str()).collect()
    }

    /// 按导出选项拼接音节文本。
    ///
    /// 空行返回分隔符本身：向 KBS 导入歌词时，单独的音节分隔符表示
    /// 空行而不是换页。开启 `space_is_separator` 时，音节内部的空格
    /// 会被等长的下划线替换，行尾空格则抵掉一个分隔符。
    #[must_use]
    pub fn text_with_separators(&self, separator: &str, space_is_separator: bool) -> String {
        if self.is_empty() {
            return separator.to_string();
        }

        if space_is_separator && !separator.is_empty() {
            let mut result = String::new();
            for syllable in &self.syllables {
                let trimmed_len = syllable.text.trim_end_matches(' ').len();
                let (body, trailing) = syllable.text.split_at(trimmed_len);
                result.push_str(&body.replace(' ', "_"));
                result.push_str(trailing);
                if !syllable.text.ends_with(' ') {
                    result.push_str(separator);
                }
            }
            let cut: usize = result
                .chars()
                .rev()
                .take(separator.chars().count())
                .map(char::len_utf8)
                .sum();
            result.truncate(result.len() - cut);
            result
        } else {
            self.syllables
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(separator)
        }
    }
}

/// 一个 PAGEV2 块：页面过渡方式加有序的歌词行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpPage {
    /// 移除过渡编号，空字符串表示逐行。
    pub remove: String,
    /// 显示过渡编号，空字符串表示逐行。
    pub display: String,
    /// 页面内的歌词行。
    pub lines: Vec<KbpLine>,
}

impl KbpPage {
    /// 页面内第一个非空行的开始时间。
    #[must_use]
    pub fn start(&self) -> Option<i64> {
        self.lines
            .iter()
            .filter(|line| !line.is_empty())
            .map(KbpLine::start)
            .min()
    }

    /// 页面内最晚的行结束时间。
    #[must_use]
    pub fn end(&self) -> Option<i64> {
        self.lines.iter().map(KbpLine::end).max()
    }
}

/// 一个 IMAGE 块。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpImage {
    /// 开始时间（厘秒）。
    pub start: i64,
    /// 结束时间（厘秒）。
    pub end: i64,
    /// 图片文件名。
    pub filename: String,
    /// 是否在块结束后保留在屏幕上。
    pub leave_on_screen: i32,
}

/// 页边距配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpMargins {
    /// 左边距。
    pub left: i32,
    /// 右边距。
    pub right: i32,
    /// 上边距。
    pub top: i32,
    /// 行间距。
    pub spacing: i32,
}

/// Other 节中的杂项配置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpOther {
    /// 边框颜色编号。
    pub border_color: i32,
    /// 默认擦除方式编号，替换音节上为 0 的擦除方式。
    pub wipe_detail: i32,
}

/// 轨道信息的同步完成标记。
pub const TRACK_STATUS_SYNCED: &str = "1";

/// 轨道信息键值对。
///
/// 格式上允许自由的键值，目前观察到的键为 status、title、artist、
/// audio、buildfile、intro、outro 和 comments。键在存储时统一转为小写，
/// 缩进的续行以换行符拼接到上一个键的值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpTrackInfo {
    entries: HashMap<String, String>,
}

impl KbpTrackInfo {
    /// 从键值对构造轨道信息。
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// 按键查询值。键应为小写。
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// 轨道是否已完成同步。
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.get("status") == Some(TRACK_STATUS_SYNCED)
    }

    /// 同步状态字段的原始值。
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.get("status")
    }

    /// 曲目标题。
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// 艺术家。
    #[must_use]
    pub fn artist(&self) -> Option<&str> {
        self.get("artist")
    }

    /// 音频文件。
    #[must_use]
    pub fn audio(&self) -> Option<&str> {
        self.get("audio")
    }

    /// 构建产物文件名。
    #[must_use]
    pub fn build_file(&self) -> Option<&str> {
        self.get("buildfile")
    }

    /// 前奏时长。
    #[must_use]
    pub fn intro(&self) -> Option<&str> {
        self.get("intro")
    }

    /// 尾奏时长。
    #[must_use]
    pub fn outro(&self) -> Option<&str> {
        self.get("outro")
    }

    /// 备注。
    #[must_use]
    pub fn comments(&self) -> Option<&str> {
        self.get("comments")
    }
}

/// 解析完成的 KBP 工程文件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbpFile {
    /// 调色板。
    pub colors: KbpPalette,
    /// 样式集合。
    pub styles: KbpStyleCollection,
    /// 页边距。
    pub margins: KbpMargins,
    /// 杂项配置。
    pub other: KbpOther,
    /// 轨道信息。
    pub track_info: KbpTrackInfo,
    /// 有序的页面块。
    pub pages: Vec<KbpPage>,
    /// 有序的图片块。
    pub images: Vec<KbpImage>,
}

impl KbpFile {
    /// 提取不带时间信息的歌词文本。
    ///
    /// 想得到可以重新导入 KBS 开始同步的文本，可以使用：
    /// 包含空行、以 `/` 作为音节分隔符并把空格视为分隔。
    #[must_use]
    pub fn text(&self, options: &TextExtractionOptions) -> String {
        let page_texts: Vec<String> = self
            .pages
            .iter()
            .map(|page| {
                page.lines
                    .iter()
                    .filter(|line| options.include_empty || !line.is_empty())
                    .map(|line| {
                        line.text_with_separators(
                            &options.syllable_separator,
                            options.space_is_separator,
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();
        page_texts.join(&format!("\n{}\n", options.page_separator))
    }
}
