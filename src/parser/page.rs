//! PAGEV2 节的子解析器。
//!
//! 匹配行头模式的行打开一条新的歌词行，空行关闭它；其余非空行是
//! 音节记录。`FX/` 过渡行只在页面的第一个行头之前有效。

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::{
    error::ConvertError,
    model::{KbpLine, KbpLineHeader, KbpPage, KbpSyllable},
};

/// 行头模式：对齐/样式字母/开始/结束/右移/下移/旋转，只有最后 3 个字段可以为负。
static LINE_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[LCR]/[a-zA-Z](/\d+){2}(/-?\d+){3}$").expect("未能编译 LINE_HEADER_REGEX")
});

/// 音节文本中代表字面 `/` 的转义序列，`/` 本身用于分隔字段。
const SLASH_ESCAPE: &str = "{-}";

/// 解析一个 PAGEV2 块的全部行（不含块首尾的标记与分隔线）。
pub(super) fn parse_page(
    page_lines: &[&str],
    default_wipe: Option<i32>,
) -> Result<KbpPage, ConvertError> {
    let mut lines: Vec<KbpLine> = Vec::new();
    let mut syllables: Vec<KbpSyllable> = Vec::new();
    let mut header: Option<KbpLineHeader> = None;
    // 默认逐行过渡
    let mut transitions = (String::new(), String::new());
    let mut seen_header = false;

    for &line in page_lines {
        if header.is_none() && LINE_HEADER_REGEX.is_match(line) {
            header = Some(parse_line_header(line)?);
            seen_header = true;
        } else if line.is_empty() {
            // 空行关闭当前打开的歌词行
            if let Some(header) = header.take() {
                lines.push(KbpLine {
                    header,
                    syllables: std::mem::take(&mut syllables),
                });
            }
        } else if !seen_header && line.starts_with("FX/") {
            let fields: Vec<&str> = line.split('/').collect();
            if fields.len() != 3 {
                return Err(ConvertError::InvalidKbpFormat(format!(
                    "无效的过渡行: {line:?}"
                )));
            }
            transitions = (fields[1].to_string(), fields[2].to_string());
        } else {
            syllables.push(parse_syllable(line, default_wipe)?);
        }
    }

    if header.is_some() {
        warn!("页面块在歌词行关闭前结束，最后一行被丢弃");
    }

    Ok(KbpPage {
        remove: transitions.0,
        display: transitions.1,
        lines,
    })
}

fn parse_line_header(line: &str) -> Result<KbpLineHeader, ConvertError> {
    let fields: Vec<&str> = line.split('/').collect();
    let align = fields[0]
        .chars()
        .next()
        .expect("正则已保证对齐字段非空");
    let style_letter = fields[1]
        .chars()
        .next()
        .expect("正则已保证样式字段非空");
    Ok(KbpLineHeader {
        align,
        style_letter,
        start: fields[2].parse()?,
        end: fields[3].parse()?,
        right: fields[4].parse()?,
        down: fields[5].parse()?,
        rotation: fields[6].parse()?,
    })
}

fn parse_syllable(line: &str, default_wipe: Option<i32>) -> Result<KbpSyllable, ConvertError> {
    let fields: Vec<&str> = line.split('/').collect();
    if fields.len() != 4 {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "无效的音节记录: {line:?}"
        )));
    }
    let text = fields[0].replace(SLASH_ESCAPE, "/");
    // 只有开始时间字段会带对齐用的前导空格
    let start: i64 = fields[1].trim_start().parse()?;
    let end: i64 = fields[2].parse()?;
    let mut wipe: i32 = fields[3].parse()?;
    if let Some(default) = default_wipe
        && default != 0
        && wipe == 0
    {
        wipe = default;
    }
    Ok(KbpSyllable {
        text,
        start,
        end,
        wipe,
    })
}
