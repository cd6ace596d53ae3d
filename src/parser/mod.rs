//! # KBP (Karaoke Builder Studio) 工程文件解析器
//!
//! 逐行扫描的状态机。固定宽度的分隔线把文件切成顶层的节：分隔线后紧跟
//! `HEADERV2` 进入头部模式，在头部模式下按节标题分派给各个子解析器；
//! 分隔线后紧跟 `PAGEV2` 或 `IMAGE` 则读取对应的正文块。
//! 注释行和空行不影响"刚经过分隔线"的判定。

mod page;
mod styles;

use std::collections::HashMap;

use crate::{
    config::KbpParsingOptions,
    error::ConvertError,
    model::{KbpFile, KbpImage, KbpMargins, KbpOther, KbpPalette, KbpTrackInfo},
};

/// 顶层分节之间的固定宽度分隔线。
pub(crate) const DIVIDER: &str = "-----------------------------";

const HEADER_MARKER: &str = "HEADERV2";
const PAGE_MARKER: &str = "PAGEV2";
const IMAGE_MARKER: &str = "IMAGE";
const STYLES_END_MARKER: &str = "  StyleEnd";
const TRACK_INFO_MARKER: &str = "'--- Track Information ---";

/// 解析 KBP 工程文件。
///
/// 输入按行处理，行尾空白在解析前去除。
///
/// # 参数
///
/// * `content` - KBP 工程文件的内容字符串。
/// * `options` - 解析选项，控制颜色与默认擦除方式的解析。
///
/// # 返回
///
/// * `Ok(KbpFile)` - 成功解析后，返回完整的工程文件结构。
/// * `Err(ConvertError)` - 解析失败时，返回具体的错误信息。
///
/// # Errors
///
/// 此函数在以下情况下会返回错误：
///
/// * [`ConvertError::ParseInt`] - 应为整数的字段无法解析时
/// * [`ConvertError::InvalidKbpFormat`] - 行结构不符合 KBP 语法时
/// * [`ConvertError::UnsupportedTrackState`] - 轨道尚未完成同步时
/// * [`ConvertError::MissingSections`] - 解析结束时缺少必需的节时
pub fn parse_kbp(content: &str, options: &KbpParsingOptions) -> Result<KbpFile, ConvertError> {
    let lines: Vec<&str> = content.lines().map(str::trim_end).collect();

    let mut colors: Option<KbpPalette> = None;
    let mut style_collection = None;
    let mut margins: Option<KbpMargins> = None;
    let mut other: Option<KbpOther> = None;
    let mut track_info: Option<KbpTrackInfo> = None;
    let mut pages = Vec::new();
    let mut images = Vec::new();

    let mut in_header = false;
    let mut just_saw_divider = false;

    for (index, &line) in lines.iter().enumerate() {
        if in_header {
            if line.starts_with("'Palette Colours") {
                colors = Some(KbpPalette::from_line(data_line(&lines, index)?)?);
            } else if line.starts_with("'Styles") {
                let end = find_line(&lines, index + 1, STYLES_END_MARKER)?;
                let palette = if options.resolve_colors {
                    Some(colors.as_ref().ok_or_else(|| {
                        ConvertError::InvalidKbpFormat(
                            "需要解析颜色，但 Styles 节出现在调色板之前".to_string(),
                        )
                    })?)
                } else {
                    None
                };
                style_collection = Some(styles::parse_styles(&lines[index + 1..end], palette)?);
            } else if line.starts_with("'Margins") {
                margins = Some(parse_margins(data_line(&lines, index)?)?);
            } else if line.starts_with("'Other") {
                other = Some(parse_other(data_line(&lines, index)?)?);
            } else if line == TRACK_INFO_MARKER {
                let end = find_line(&lines, index + 1, DIVIDER)?;
                let info = parse_track_info(&lines[index + 1..end])?;
                if !info.is_synced() {
                    return Err(ConvertError::UnsupportedTrackState(format!(
                        "轨道必须先完成同步才能使用，当前状态为 {:?}",
                        info.status().unwrap_or("")
                    )));
                }
                track_info = Some(info);
            }
        } else if just_saw_divider && line == PAGE_MARKER {
            let end = find_line(&lines, index + 1, DIVIDER)?;
            let default_wipe = if options.resolve_wipe {
                let other = other.as_ref().ok_or_else(|| {
                    ConvertError::InvalidKbpFormat(
                        "需要解析默认擦除方式，但页面块出现在 Other 节之前".to_string(),
                    )
                })?;
                Some(other.wipe_detail)
            } else {
                None
            };
            pages.push(page::parse_page(&lines[index + 1..end], default_wipe)?);
        } else if just_saw_divider && line == IMAGE_MARKER {
            images.push(parse_image(data_line(&lines, index)?)?);
        }

        if just_saw_divider && line == HEADER_MARKER {
            in_header = true;
        }

        if line == DIVIDER {
            in_header = false;
            just_saw_divider = true;
        } else if !line.is_empty() && !line.starts_with('\'') {
            // 空行和注释行之后，上一条分隔线仍然有效
            just_saw_divider = false;
        }
    }

    let mut missing = Vec::new();
    if colors.is_none() {
        missing.push("colors");
    }
    if style_collection.is_none() {
        missing.push("styles");
    }
    if margins.is_none() {
        missing.push("margins");
    }
    if other.is_none() {
        missing.push("other");
    }
    if pages.is_empty() {
        missing.push("pages");
    }
    if track_info.is_none() {
        missing.push("trackinfo");
    }
    if !missing.is_empty() {
        return Err(ConvertError::MissingSections(missing.join(", ")));
    }

    let (Some(colors), Some(styles), Some(margins), Some(other), Some(track_info)) =
        (colors, style_collection, margins, other, track_info)
    else {
        unreachable!("缺失的节已在上方检查");
    };

    Ok(KbpFile {
        colors,
        styles,
        margins,
        other,
        track_info,
        pages,
        images,
    })
}

/// 取出节标题之后的数据行。
fn data_line<'a>(lines: &[&'a str], index: usize) -> Result<&'a str, ConvertError> {
    lines
        .get(index + 1)
        .copied()
        .ok_or_else(|| ConvertError::InvalidKbpFormat("节标题后缺少数据行".to_string()))
}

/// 从 `from` 开始寻找与 `marker` 完全相同的行。
fn find_line(lines: &[&str], from: usize, marker: &str) -> Result<usize, ConvertError> {
    lines[from..]
        .iter()
        .position(|&line| line == marker)
        .map(|offset| from + offset)
        .ok_or_else(|| ConvertError::InvalidKbpFormat(format!("未找到 {marker:?} 行")))
}

fn parse_margins(line: &str) -> Result<KbpMargins, ConvertError> {
    let fields = parse_int_fields(line, 4, "Margins")?;
    Ok(KbpMargins {
        left: fields[0],
        right: fields[1],
        top: fields[2],
        spacing: fields[3],
    })
}

fn parse_other(line: &str) -> Result<KbpOther, ConvertError> {
    let fields = parse_int_fields(line, 2, "Other")?;
    Ok(KbpOther {
        border_color: fields[0],
        wipe_detail: fields[1],
    })
}

/// 解析一个逗号分隔的整数行，并校验字段数量。
fn parse_int_fields(line: &str, expected: usize, section: &str) -> Result<Vec<i32>, ConvertError> {
    let fields = line
        .trim()
        .split(',')
        .map(|field| field.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()?;
    if fields.len() != expected {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "{section} 节应包含 {expected} 个字段，实际为 {}",
            fields.len()
        )));
    }
    Ok(fields)
}

fn parse_track_info(lines: &[&str]) -> Result<KbpTrackInfo, ConvertError> {
    let mut entries: HashMap<String, String> = HashMap::new();
    let mut prev: Option<String> = None;
    for &line in lines {
        if line.starts_with(' ') {
            // 缩进的续行拼接到上一个键的值
            let Some(key) = &prev else {
                return Err(ConvertError::InvalidKbpFormat(
                    "轨道信息的续行没有所属的键".to_string(),
                ));
            };
            let value = entries
                .get_mut(key)
                .expect("prev 必然指向已插入的键");
            value.push('\n');
            value.push_str(line.trim_start());
        } else if !line.is_empty() && !line.starts_with('\'') {
            let (key, value) = match line.split_once(char::is_whitespace) {
                Some((key, rest)) => (key, rest.trim_start()),
                None => (line, ""),
            };
            let key = key.to_lowercase();
            entries.insert(key.clone(), value.to_string());
            prev = Some(key);
        }
    }
    Ok(KbpTrackInfo::new(entries))
}

fn parse_image(line: &str) -> Result<KbpImage, ConvertError> {
    let fields: Vec<&str> = line.split('/').collect();
    if fields.len() != 4 {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "无效的图片记录: {line:?}"
        )));
    }
    Ok(KbpImage {
        start: fields[0].parse()?,
        end: fields[1].parse()?,
        filename: fields[2].to_string(),
        leave_on_screen: fields[3].parse()?,
    })
}
