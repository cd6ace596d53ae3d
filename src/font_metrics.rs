//! 字体行距查询表。
//!
//! 为常见字体的常用字号提供硬编码的行距提示，留给将来的排版微调使用，
//! 转换器目前不会调用它。表中未收录的组合返回 `None`，由调用方决定
//! 退回到 [`DEFAULT_SPACING`]。

use crate::model::KbpStyle;

/// 查询表未命中时的默认行距（Arial 12 加粗）。
pub const DEFAULT_SPACING: u32 = 19;

/// 表中收录的最小字号。
const MIN_SIZE: i32 = 10;

struct FontSpacing {
    name: &'static str,
    regular: &'static [u32],
    /// 加粗行距与常规不同的字体才会填写，否则共用常规表。
    bold: Option<&'static [u32]>,
}

static FONT_SPACINGS: &[FontSpacing] = &[
    FontSpacing {
        name: "Arial",
        regular: &[16, 17, 18, 19, 22, 23, 24, 26, 27],
        bold: Some(&[16, 18, 19, 19, 22, 24, 24, 27, 29]),
    },
    FontSpacing {
        name: "Tahoma",
        regular: &[16, 18, 19, 21, 23, 24],
        bold: None,
    },
    FontSpacing {
        name: "Kozuka Gothic Pro H",
        regular: &[19, 22, 23, 24, 27, 29],
        bold: None,
    },
    FontSpacing {
        name: "Helvetica LT std",
        regular: &[15, 18, 19, 20, 23, 24],
        bold: None,
    },
    FontSpacing {
        name: "Open Sans Semibold",
        regular: &[19, 22, 23, 24, 27, 28],
        bold: None,
    },
    FontSpacing {
        name: "Franklin Gothic Book",
        regular: &[17, 20, 21, 21, 24, 25],
        bold: None,
    },
    FontSpacing {
        name: "Franklin Gothic Demi",
        regular: &[17, 20, 21, 21, 24, 25],
        bold: None,
    },
    FontSpacing {
        name: "Franklin Gothic Medium",
        regular: &[17, 20, 21, 21, 24, 25],
        bold: None,
    },
    FontSpacing {
        name: "MS Gothic",
        regular: &[13, 15, 16, 17, 19, 20, 21, 23, 24],
        bold: None,
    },
    FontSpacing {
        name: "Gadugi",
        regular: &[16, 18, 19, 20, 22, 24, 25],
        bold: Some(&[16, 18, 19, 20, 21, 24, 25]),
    },
    FontSpacing {
        name: "Verdana",
        regular: &[16, 18, 18, 20, 23, 25, 25],
        bold: None,
    },
];

/// 查询给定字体、字号与加粗状态的行距提示。
///
/// 返回 `None` 表示该组合不在表中，调用方应退回到 [`DEFAULT_SPACING`]。
#[must_use]
pub fn spacing_hint(font_name: &str, font_size: i32, bold: bool) -> Option<u32> {
    let entry = FONT_SPACINGS.iter().find(|font| font.name == font_name)?;
    let table = if bold {
        entry.bold.unwrap_or(entry.regular)
    } else {
        entry.regular
    };
    let index = usize::try_from(font_size - MIN_SIZE).ok()?;
    table.get(index).copied()
}

/// 按样式查询行距，未命中时退回默认值。
#[must_use]
pub fn spacing_for_style(style: &KbpStyle) -> u32 {
    spacing_hint(
        &style.font_name,
        style.font_size,
        style.font_style.contains('B'),
    )
    .unwrap_or(DEFAULT_SPACING)
}
