//! # KBP 到 ASS 字幕的转换器
//!
//! 对已解析的 [`KbpFile`] 做一次遍历，产出 [`AssDocument`]：
//! 固定的展示元数据、被歌词行实际引用的样式，以及每个非空行对应的
//! 一条带卡拉OK标记的对话事件。

mod document;
mod markup;

use std::collections::BTreeSet;

pub use document::{AssDialogue, AssDocument, AssScriptInfo, AssStyle};

use crate::{
    config::AssOptions,
    error::ConvertError,
    model::{KbpFile, KbpPalette, KbpStyle, KbpStyleCollection},
};

/// ASS 画布宽度。
pub(crate) const PLAY_RES_X: i64 = 300;
/// ASS 画布高度。
pub(crate) const PLAY_RES_Y: i64 = 216;

/// KBP 字号到 ASS 字号的固定缩放倍数。
const FONT_SCALE: f64 = 1.4;
/// 标记事件来源的效果字段。
const KARAOKE_EFFECT: &str = "karaoke";
/// KBP 时间单位（厘秒）到 ASS 毫秒的换算倍数。
const CS_TO_MS: i64 = 10;

/// 转换的主入口函数：生成 ASS 文本。
///
/// # 参数
///
/// * `file` - 已解析的 KBP 工程文件。
/// * `options` - ASS 生成选项。
///
/// # Errors
///
/// 样式引用无法解析、颜色字段表示混乱或格式化输出失败时返回
/// [`ConvertError`]。
pub fn generate_ass(file: &KbpFile, options: &AssOptions) -> Result<String, ConvertError> {
    convert_to_ass(file, options)?.render()
}

/// 把 KBP 工程转换为结构化的 ASS 文档。
pub fn convert_to_ass(file: &KbpFile, options: &AssOptions) -> Result<AssDocument, ConvertError> {
    // 固定样式在首次引用时惰性派生，克隆集合以保持输入不变
    let mut styles = file.styles.clone();
    let mut used_keys: BTreeSet<i32> = BTreeSet::new();
    let mut events = Vec::new();

    for page in &file.pages {
        for (line_index, line) in page.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let key = KbpStyleCollection::alpha_to_key(line.style_letter()).ok_or_else(|| {
                ConvertError::InvalidKbpFormat(format!(
                    "无效的样式字母: {:?}",
                    line.style_letter()
                ))
            })?;
            let style = styles.get_or_derive(key)?;
            let text = if style.fixed {
                // 固定样式不做擦除，纯文本展示
                line.text()
            } else {
                markup::karaoke_text(line, &file.margins, line_index, options)?
            };
            events.push(AssDialogue {
                start_ms: line.start() * CS_TO_MS,
                end_ms: line.end() * CS_TO_MS,
                style: ass_style_name(key, &style.name),
                effect: KARAOKE_EFFECT.to_string(),
                text,
            });
            used_keys.insert(key);
        }
    }

    let mut ass_styles = Vec::with_capacity(used_keys.len());
    for key in used_keys {
        let style = styles.get_or_derive(key)?;
        ass_styles.push(build_ass_style(key, style, &file.colors)?);
    }

    let script_info = AssScriptInfo {
        title: file.track_info.title().unwrap_or_default().to_string(),
        ..AssScriptInfo::default()
    };

    Ok(AssDocument {
        script_info,
        styles: ass_styles,
        events,
    })
}

/// 由集合键与 KBP 样式名组合出 ASS 样式名。
fn ass_style_name(key: i32, kbp_name: &str) -> String {
    format!("Style{:02}_{}", key.abs(), kbp_name)
}

/// 把 3 位 KBP 颜色代码转换为 ASS 颜色：每位翻倍扩展成 6 位，
/// 通道顺序反转，并加上完全不透明的 alpha 前缀。
fn kbp_to_ass_color(code: &str) -> String {
    let mut color = String::with_capacity(4 + code.len() * 2);
    color.push_str("&H00");
    for c in code.chars().rev() {
        color.push(c);
        color.push(c);
    }
    color
}

fn build_ass_style(
    key: i32,
    style: &KbpStyle,
    palette: &KbpPalette,
) -> Result<AssStyle, ConvertError> {
    // 颜色字段必须是统一的表示，混用在这里报错
    style.has_resolved_colors()?;
    Ok(AssStyle {
        name: ass_style_name(key, &style.name),
        font_name: style.font_name.clone(),
        font_size: f64::from(style.font_size) * FONT_SCALE,
        secondary_colour: kbp_to_ass_color(style.text_color.resolve(palette)?),
        primary_colour: kbp_to_ass_color(style.text_wipe_color.resolve(palette)?),
        outline_colour: kbp_to_ass_color(style.outline_color.resolve(palette)?),
        // ASS 没有描边擦除色的槽位，放进 BackColour 尽量保留信息
        back_colour: kbp_to_ass_color(style.outline_wipe_color.resolve(palette)?),
        bold: style.font_style.contains('B'),
        italic: style.font_style.contains('I'),
        underline: style.font_style.contains('U'),
        strike_out: style.font_style.contains('S'),
        // KBP 的 4 个方向描边在 ASS 里只有一个槽位，取平均值
        outline: f64::from(style.outlines.iter().sum::<i32>()) / 4.0,
        shadow: f64::from(style.shadows.iter().sum::<i32>()) / 2.0,
        // 实际位置由每行的坐标覆盖，锚点固定为顶部居中
        alignment: 8,
        // 定位逐行指定，样式级别的边距固定为 0
        margin_l: 0,
        margin_r: 0,
        margin_v: 0,
        encoding: style.charset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        KbpColor, KbpLine, KbpLineHeader, KbpMargins, KbpOther, KbpPage, KbpSyllable,
        KbpTrackInfo,
    };
    use std::collections::HashMap;

    fn sample_file() -> KbpFile {
        let codes = [
            "000", "FFF", "F00", "0F0", "00F", "FF0", "0FF", "F0F", "888", "CCC", "400", "040",
            "004", "440", "044", "404",
        ];
        let palette =
            KbpPalette::new(codes.iter().map(ToString::to_string).collect()).unwrap();

        let mut styles = KbpStyleCollection::default();
        styles
            .insert(
                1,
                KbpStyle {
                    name: "Default".to_string(),
                    text_color: KbpColor::Palette(1),
                    outline_color: KbpColor::Palette(0),
                    text_wipe_color: KbpColor::Palette(2),
                    outline_wipe_color: KbpColor::Palette(0),
                    font_name: "Arial".to_string(),
                    font_size: 12,
                    font_style: "B".to_string(),
                    charset: 0,
                    outlines: [1, 1, 1, 1],
                    shadows: [0, 0],
                    wipe_style: 0,
                    all_caps: "L".to_string(),
                    fixed: false,
                },
            )
            .unwrap();
        styles
            .insert(
                2,
                KbpStyle {
                    name: "Unused".to_string(),
                    text_color: KbpColor::Palette(1),
                    outline_color: KbpColor::Palette(0),
                    text_wipe_color: KbpColor::Palette(2),
                    outline_wipe_color: KbpColor::Palette(0),
                    font_name: "Tahoma".to_string(),
                    font_size: 14,
                    font_style: String::new(),
                    charset: 0,
                    outlines: [2, 2, 2, 2],
                    shadows: [1, 1],
                    wipe_style: 0,
                    all_caps: "L".to_string(),
                    fixed: false,
                },
            )
            .unwrap();

        let line = KbpLine {
            header: KbpLineHeader {
                align: 'C',
                style_letter: 'A',
                start: 100,
                end: 500,
                right: 0,
                down: 0,
                rotation: 0,
            },
            syllables: vec![
                KbpSyllable {
                    text: "Hi".to_string(),
                    start: 100,
                    end: 200,
                    wipe: 1,
                },
                KbpSyllable {
                    text: "there".to_string(),
                    start: 205,
                    end: 500,
                    wipe: 1,
                },
            ],
        };
        let empty_line = KbpLine {
            header: KbpLineHeader {
                align: 'C',
                style_letter: 'A',
                start: 500,
                end: 600,
                right: 0,
                down: 0,
                rotation: 0,
            },
            syllables: vec![],
        };

        let mut entries = HashMap::new();
        entries.insert("status".to_string(), "1".to_string());
        entries.insert("title".to_string(), "Test Song".to_string());

        KbpFile {
            colors: palette,
            styles,
            margins: KbpMargins {
                left: 2,
                right: 2,
                top: 8,
                spacing: 12,
            },
            other: KbpOther {
                border_color: 5,
                wipe_detail: 1,
            },
            track_info: KbpTrackInfo::new(entries),
            pages: vec![KbpPage {
                remove: String::new(),
                display: String::new(),
                lines: vec![line, empty_line],
            }],
            images: vec![],
        }
    }

    #[test]
    fn test_convert_single_wiped_line() {
        let document = convert_to_ass(&sample_file(), &AssOptions::default()).unwrap();

        assert_eq!(document.script_info.title, "Test Song");
        assert_eq!(document.events.len(), 1, "空行不应产生事件");

        let event = &document.events[0];
        assert_eq!(event.start_ms, 1000);
        assert_eq!(event.end_ms, 5000);
        assert_eq!(event.style, "Style01_Default");
        assert_eq!(event.effect, "karaoke");
        assert_eq!(
            event.text,
            r"{\pos(150,20)}{\fad(300,200)}{\kf100}Hi{\k5}{\kf295}there"
        );
    }

    #[test]
    fn test_only_referenced_styles_are_emitted() {
        let document = convert_to_ass(&sample_file(), &AssOptions::default()).unwrap();
        assert_eq!(document.styles.len(), 1);
        assert_eq!(document.styles[0].name, "Style01_Default");
    }

    #[test]
    fn test_fixed_line_emits_plain_text() {
        let mut file = sample_file();
        file.pages[0].lines[0].header.style_letter = 'a';
        let document = convert_to_ass(&file, &AssOptions::default()).unwrap();

        let event = &document.events[0];
        assert_eq!(event.text, "Hithere", "固定样式的行不携带任何控制代码");
        assert_eq!(event.style, "Style01_Default_fixed");

        let style = &document.styles[0];
        assert_eq!(style.name, "Style01_Default_fixed");
        assert_eq!(
            style.primary_colour, style.secondary_colour,
            "固定样式的擦除色被重定义为未擦除的颜色"
        );
    }

    #[test]
    fn test_style_mapping() {
        let document = convert_to_ass(&sample_file(), &AssOptions::default()).unwrap();
        let style = &document.styles[0];

        assert!((style.font_size - 16.8).abs() < 1e-9);
        assert_eq!(style.secondary_colour, "&H00FFFFFF");
        assert_eq!(style.primary_colour, "&H000000FF");
        assert!(style.bold);
        assert!(!style.italic);
        assert!((style.outline - 1.0).abs() < f64::EPSILON);
        assert!((style.shadow - 0.0).abs() < f64::EPSILON);
        assert_eq!(style.alignment, 8);
        assert_eq!(style.margin_l, 0);
        assert_eq!(style.encoding, 0);
    }

    #[test]
    fn test_color_conversion() {
        assert_eq!(kbp_to_ass_color("ABC"), "&H00CCBBAA");
        assert_eq!(kbp_to_ass_color("F00"), "&H000000FF");
        assert_eq!(kbp_to_ass_color("000"), "&H00000000");
        assert_eq!(kbp_to_ass_color("ABC").len(), 10);
    }

    #[test]
    fn test_mixed_colors_fail_conversion() {
        let mut file = sample_file();
        let mut style = file.styles.get(1).unwrap().clone();
        style.text_color = KbpColor::Rgb("FFF".to_string());
        file.styles.insert(1, style).unwrap();

        assert!(matches!(
            convert_to_ass(&file, &AssOptions::default()),
            Err(ConvertError::MixedColorTypes(_))
        ));
    }

    #[test]
    fn test_resolved_colors_convert_without_palette_lookup() {
        let mut file = sample_file();
        let resolved = file
            .styles
            .get(1)
            .unwrap()
            .resolve_colors(&file.colors)
            .unwrap();
        file.styles.insert(1, resolved).unwrap();

        let document = convert_to_ass(&file, &AssOptions::default()).unwrap();
        assert_eq!(document.styles[0].secondary_colour, "&H00FFFFFF");
    }
}
