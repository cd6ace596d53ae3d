//! Styles 节的子解析器。
//!
//! 每个样式定义占 3 个非空行（颜色与名称、字体、描边与标志），
//! 记录之间以空行分隔。记录之后直到下一个空行的内容全部忽略。

use tracing::debug;

use crate::{
    error::ConvertError,
    model::{KbpColor, KbpPalette, KbpStyle, KbpStyleBuilder, KbpStyleCollection},
};

/// 解析 Styles 节的全部行（不含 `StyleEnd` 标记）。
///
/// 传入调色板时，样式中的调色板索引会被立即解析为颜色代码。
pub(super) fn parse_styles(
    style_lines: &[&str],
    palette: Option<&KbpPalette>,
) -> Result<KbpStyleCollection, ConvertError> {
    let data: Vec<&str> = style_lines
        .iter()
        .filter(|line| !line.starts_with('\''))
        .copied()
        .collect();

    let mut collection = KbpStyleCollection::default();
    let mut index = 0;
    while index < data.len() {
        let line = data[index].trim_start();
        if line.is_empty() {
            index += 1;
            continue;
        }
        if line.starts_with("Style") {
            let (key, style) = parse_record(&data, index, line)?;
            let style = match palette {
                Some(palette) => style.resolve_colors(palette)?,
                None => style,
            };
            collection.insert(key, style)?;
            index += 3;
            // 记录之后直到空行为止的内容不属于任何样式
            while index < data.len() && !data[index].trim_start().is_empty() {
                debug!("忽略样式记录后的多余行: {:?}", data[index]);
                index += 1;
            }
        } else {
            debug!("忽略 Styles 节中无法识别的行: {line:?}");
            index += 1;
        }
    }
    Ok(collection)
}

/// 解析从 `index` 开始的一条 3 行样式记录，返回集合键与样式。
fn parse_record(
    data: &[&str],
    index: usize,
    first_line: &str,
) -> Result<(i32, KbpStyle), ConvertError> {
    let fields: Vec<&str> = first_line.split(',').collect();
    if fields.len() < 6 {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "无效的样式定义行: {first_line:?}"
        )));
    }
    // UI 中样式编号从 01 显示，集合键加一对齐，同时给固定样式留出负键
    let style_number: i32 = fields[0]["Style".len()..].parse()?;
    let name = fields[1];
    let color_indices = fields[2..6]
        .iter()
        .map(|field| field.parse::<u8>())
        .collect::<Result<Vec<_>, _>>()?;

    let font_line = record_line(data, index + 1, first_line)?;
    let font_fields: Vec<&str> = font_line.split(',').collect();
    if font_fields.len() < 4 {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "无效的样式字体行: {font_line:?}"
        )));
    }

    let detail_line = record_line(data, index + 2, first_line)?;
    let detail_fields: Vec<&str> = detail_line.split(',').collect();
    if detail_fields.len() < 8 {
        return Err(ConvertError::InvalidKbpFormat(format!(
            "无效的样式描边行: {detail_line:?}"
        )));
    }
    let detail_numbers = detail_fields[..7]
        .iter()
        .map(|field| field.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()?;

    let style = KbpStyleBuilder::default()
        .name(name)
        .text_color(KbpColor::Palette(color_indices[0]))
        .outline_color(KbpColor::Palette(color_indices[1]))
        .text_wipe_color(KbpColor::Palette(color_indices[2]))
        .outline_wipe_color(KbpColor::Palette(color_indices[3]))
        .font_name(font_fields[0])
        .font_size(font_fields[1].parse::<i32>()?)
        .font_style(font_fields[2])
        .charset(font_fields[3].parse::<i32>()?)
        .outlines([
            detail_numbers[0],
            detail_numbers[1],
            detail_numbers[2],
            detail_numbers[3],
        ])
        .shadows([detail_numbers[4], detail_numbers[5]])
        .wipe_style(detail_numbers[6])
        .all_caps(detail_fields[7])
        .fixed(false)
        .build()
        .unwrap();

    Ok((style_number + 1, style))
}

/// 取出记录中的后续行并去除缩进。
fn record_line<'a>(
    data: &[&'a str],
    index: usize,
    first_line: &str,
) -> Result<&'a str, ConvertError> {
    data.get(index)
        .map(|line| line.trim_start())
        .ok_or_else(|| {
            ConvertError::InvalidKbpFormat(format!("样式记录不完整: {first_line:?}"))
        })
}
