//! KBP 解析与 ASS 生成的选项类型。

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// KBP 解析选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpParsingOptions {
    /// 是否在解析样式时立刻将调色板索引解析为具体颜色代码。
    pub resolve_colors: bool,
    /// 是否将音节上为 0 的擦除方式替换为 Other 节中的文件级默认值。
    pub resolve_wipe: bool,
}

impl Default for KbpParsingOptions {
    fn default() -> Self {
        Self {
            resolve_colors: false,
            resolve_wipe: true,
        }
    }
}

/// 全局时间偏移选项的取值。
///
/// 目前仅被接受并保存，尚未参与任何时间计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AssOffset {
    /// 自动推断（默认）。
    #[default]
    Auto,
    /// 关闭偏移。
    Disabled,
    /// 固定偏移量（厘秒）。
    Fixed(i64),
}

/// ASS 生成选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
pub struct AssOptions {
    /// 每个对话事件的淡入时长（毫秒）。
    pub fade_in: u32,
    /// 每个对话事件的淡出时长（毫秒）。
    pub fade_out: u32,
    /// 是否使用透明背景。目前仅作记录，不影响输出。
    pub transparency: bool,
    /// 全局时间偏移。被接受并保存，但尚未被任何公式使用。
    pub offset: AssOffset,
}

impl Default for AssOptions {
    fn default() -> Self {
        Self {
            fade_in: 300,
            fade_out: 200,
            transparency: true,
            offset: AssOffset::Auto,
        }
    }
}

/// 纯文本导出选项
///
/// 用于 [`crate::model::KbpFile::text`]，从工程中提取不带时间信息的歌词文本。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextExtractionOptions {
    /// 页与页之间插入的分隔行。
    pub page_separator: String,
    /// 是否包含空行。
    pub include_empty: bool,
    /// 音节之间插入的分隔符。
    pub syllable_separator: String,
    /// 是否将空格视为音节分隔。
    ///
    /// 开启后音节内部的空格会被替换为下划线，以便文本可以重新导入同步。
    pub space_is_separator: bool,
}
