//! ASS 文档模型与序列化。

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

use super::{PLAY_RES_X, PLAY_RES_Y};

/// `[Script Info]` 部分的展示元数据。
///
/// 除标题外都是固定值：画布 300×216、不自动换行、描边随分辨率缩放、
/// 普通碰撞策略。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssScriptInfo {
    /// 标题。
    pub title: String,
    /// 脚本版本标记。
    pub script_type: String,
    /// 换行方式。
    pub wrap_style: u8,
    /// 描边和阴影是否随分辨率缩放。
    pub scaled_border_and_shadow: bool,
    /// 碰撞处理方式。
    pub collisions: String,
    /// 画布宽度。
    pub play_res_x: i64,
    /// 画布高度。
    pub play_res_y: i64,
}

impl Default for AssScriptInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            script_type: "v4.00+".to_string(),
            wrap_style: 0,
            scaled_border_and_shadow: true,
            collisions: "Normal".to_string(),
            play_res_x: PLAY_RES_X,
            play_res_y: PLAY_RES_Y,
        }
    }
}

/// `[V4+ Styles]` 中的一条样式定义。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssStyle {
    /// 样式名。
    pub name: String,
    /// 字体名。
    pub font_name: String,
    /// 字号。
    pub font_size: f64,
    /// 擦除后的文字颜色。
    pub primary_colour: String,
    /// 擦除前的文字颜色。
    pub secondary_colour: String,
    /// 描边颜色。
    pub outline_colour: String,
    /// 背景颜色。
    pub back_colour: String,
    /// 加粗。
    pub bold: bool,
    /// 斜体。
    pub italic: bool,
    /// 下划线。
    pub underline: bool,
    /// 删除线。
    pub strike_out: bool,
    /// 描边宽度。
    pub outline: f64,
    /// 阴影深度。
    pub shadow: f64,
    /// 锚点位置编号。
    pub alignment: u8,
    /// 左边距。
    pub margin_l: i32,
    /// 右边距。
    pub margin_r: i32,
    /// 垂直边距。
    pub margin_v: i32,
    /// 字符集编号。
    pub encoding: i32,
}

/// `[Events]` 中的一条对话事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssDialogue {
    /// 开始时间（毫秒）。
    pub start_ms: i64,
    /// 结束时间（毫秒）。
    pub end_ms: i64,
    /// 引用的样式名。
    pub style: String,
    /// 效果标记。
    pub effect: String,
    /// 含控制代码的事件文本。
    pub text: String,
}

/// 转换产出的 ASS 文档。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssDocument {
    /// 展示元数据。
    pub script_info: AssScriptInfo,
    /// 有序的样式列表。
    pub styles: Vec<AssStyle>,
    /// 有序的对话事件列表。
    pub events: Vec<AssDialogue>,
}

impl AssDocument {
    /// 序列化为 ASS 文本。
    pub fn render(&self) -> Result<String, ConvertError> {
        let mut output = String::with_capacity(self.events.len() * 200 + 1024);

        writeln!(output, "[Script Info]")?;
        writeln!(output, "Title: {}", self.script_info.title)?;
        writeln!(output, "ScriptType: {}", self.script_info.script_type)?;
        writeln!(output, "WrapStyle: {}", self.script_info.wrap_style)?;
        writeln!(
            output,
            "ScaledBorderAndShadow: {}",
            if self.script_info.scaled_border_and_shadow {
                "yes"
            } else {
                "no"
            }
        )?;
        writeln!(output, "Collisions: {}", self.script_info.collisions)?;
        writeln!(output, "PlayResX: {}", self.script_info.play_res_x)?;
        writeln!(output, "PlayResY: {}", self.script_info.play_res_y)?;
        writeln!(output)?;

        writeln!(output, "[V4+ Styles]")?;
        writeln!(
            output,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
        )?;
        for style in &self.styles {
            writeln!(
                output,
                "Style: {},{},{},{},{},{},{},{},{},{},{},100,100,0,0,1,{},{},{},{},{},{},{}",
                style.name,
                style.font_name,
                style.font_size,
                style.primary_colour,
                style.secondary_colour,
                style.outline_colour,
                style.back_colour,
                ass_bool(style.bold),
                ass_bool(style.italic),
                ass_bool(style.underline),
                ass_bool(style.strike_out),
                style.outline,
                style.shadow,
                style.alignment,
                style.margin_l,
                style.margin_r,
                style.margin_v,
                style.encoding,
            )?;
        }
        writeln!(output)?;

        writeln!(output, "[Events]")?;
        writeln!(
            output,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        )?;
        for event in &self.events {
            writeln!(
                output,
                "Dialogue: 0,{},{},{},,0,0,0,{},{}",
                format_ass_time(event.start_ms),
                format_ass_time(event.end_ms),
                event.style,
                event.effect,
                event.text,
            )?;
        }

        Ok(output)
    }
}

/// ASS 中的布尔字段用 -1 表示真。
const fn ass_bool(value: bool) -> i8 {
    if value { -1 } else { 0 }
}

fn format_ass_time(ms: i64) -> String {
    let total_cs = (ms + 5) / 10; // 四舍五入到厘秒
    let cs = total_cs % 100;
    let total_seconds = total_cs / 100;
    let seconds = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours}:{minutes:02}:{seconds:02}.{cs:02}")
}
