//! 逐音节卡拉OK标记与定位控制代码的生成。

use std::fmt::Write;

use crate::{
    config::AssOptions,
    error::ConvertError,
    model::{KbpLine, KbpMargins},
};

use super::PLAY_RES_X;

/// 单行歌词占用的固定高度（像素）。
const LINE_HEIGHT: i64 = 19;
/// 行内基线到行顶的固定偏移（像素）。
const LINE_CENTER_OFFSET: i64 = 12;
/// 左右对齐时距页边距的固定缩进（像素）。
const EDGE_INSET: i64 = 6;

/// 生成一行歌词的完整事件文本：定位、淡入淡出，然后是逐音节的高亮序列。
pub(super) fn karaoke_text(
    line: &KbpLine,
    margins: &KbpMargins,
    line_index: usize,
    options: &AssOptions,
) -> Result<String, ConvertError> {
    let mut text = position_tag(line, margins, line_index);
    write!(text, "{}", fade_tag(options))?;

    let mut cursor = line.start();
    for (index, syllable) in line.syllables.iter().enumerate() {
        let delay = syllable.start - cursor;
        let mut duration = syllable.end - syllable.start;

        if delay > 0 {
            // 光标与音节开始之间的静默间隙
            write!(text, "{{\\k{delay}}}")?;
        } else if delay < 0 {
            // 上一个音节越过了本音节的开始，压缩本音节的高亮时长来追回
            duration += delay;
        }

        // 一个音节默认在下一个音节开始前 1 厘秒结束。并入本音节，
        // 避免大量 \k1 的误差在长行上越积越多
        if line
            .syllables
            .get(index + 1)
            .is_some_and(|next| next.start - syllable.end == 1)
        {
            duration += 1;
        }

        write!(text, "{{\\kf{duration}}}{}", syllable.text)?;
        cursor = syllable.start + duration;
    }
    Ok(text)
}

/// 生成行的定位控制代码。
///
/// 垂直位置由页内行号与页边距决定；水平位置与锚点由对齐方式决定，
/// 无法识别的对齐值按右对齐处理。
pub(super) fn position_tag(line: &KbpLine, margins: &KbpMargins, line_index: usize) -> String {
    let y = i64::from(margins.top)
        + line_index as i64 * (i64::from(margins.spacing) + LINE_HEIGHT)
        + LINE_CENTER_OFFSET;
    match line.align() {
        'C' => format!("{{\\pos({},{y})}}", PLAY_RES_X / 2),
        'L' => format!(
            "{{\\an7\\pos({},{y})}}",
            i64::from(margins.left) + EDGE_INSET
        ),
        // R，或对齐字段损坏的文件
        _ => format!(
            "{{\\an9\\pos({},{y})}}",
            PLAY_RES_X - i64::from(margins.right) - EDGE_INSET
        ),
    }
}

/// 生成淡入淡出控制代码。
pub(super) fn fade_tag(options: &AssOptions) -> String {
    format!("{{\\fad({},{})}}", options.fade_in, options.fade_out)
}
