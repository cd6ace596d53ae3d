//! KBP 样式模型：调色板、样式定义与样式集合。

use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConvertError;

/// 调色板中颜色代码的固定数量。
pub const PALETTE_SIZE: usize = 16;

/// 16 色调色板，每项为 3 位十六进制颜色代码（如 `"F0A"`）。
///
/// 构造时校验长度和代码格式，构造后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KbpPalette {
    colors: [String; PALETTE_SIZE],
}

impl KbpPalette {
    /// 从 16 个颜色代码构造调色板。
    ///
    /// # Errors
    ///
    /// 代码数量不是 16，或任一代码不是 3 位大写十六进制时返回
    /// [`ConvertError::InvalidKbpFormat`]。
    pub fn new(colors: Vec<String>) -> Result<Self, ConvertError> {
        if colors.len() != PALETTE_SIZE {
            return Err(ConvertError::InvalidKbpFormat(format!(
                "调色板应包含 {PALETTE_SIZE} 个颜色，实际为 {}",
                colors.len()
            )));
        }
        if let Some(bad) = colors.iter().find(|code| !Self::is_valid_code(code)) {
            return Err(ConvertError::InvalidKbpFormat(format!(
                "无效的调色板颜色代码: {bad:?}"
            )));
        }
        let colors: [String; PALETTE_SIZE] = colors
            .try_into()
            .map_err(|_| ConvertError::InvalidKbpFormat("调色板长度错误".to_string()))?;
        Ok(Self { colors })
    }

    /// 从 `'Palette Colours` 节的数据行构造调色板。
    pub fn from_line(line: &str) -> Result<Self, ConvertError> {
        Self::new(
            line.trim_start()
                .split(',')
                .map(str::to_string)
                .collect::<Vec<_>>(),
        )
    }

    /// 按索引取出颜色代码。
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.colors.get(index).map(String::as_str)
    }

    fn is_valid_code(code: &str) -> bool {
        code.len() == 3
            && code
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b))
    }
}

/// 样式中的单个颜色字段。
///
/// 同一个样式的 4 个颜色字段要么全部是调色板索引，要么全部是已解析的
/// 颜色代码，不允许混用。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KbpColor {
    /// 调色板索引（0-15）。
    Palette(u8),
    /// 已解析的 3 位颜色代码。
    Rgb(String),
}

impl KbpColor {
    /// 解析为具体的颜色代码。调色板索引借助调色板查表，已解析的代码原样返回。
    pub fn resolve<'a>(&'a self, palette: &'a KbpPalette) -> Result<&'a str, ConvertError> {
        match self {
            Self::Rgb(code) => Ok(code),
            Self::Palette(index) => palette.get(usize::from(*index)).ok_or_else(|| {
                ConvertError::InvalidKbpFormat(format!("调色板索引超出范围: {index}"))
            }),
        }
    }

    const fn is_resolved(&self) -> bool {
        matches!(self, Self::Rgb(_))
    }
}

/// 单个 KBP 样式定义。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into))]
pub struct KbpStyle {
    /// 样式名。
    pub name: String,
    /// 文字颜色。
    pub text_color: KbpColor,
    /// 描边颜色。
    pub outline_color: KbpColor,
    /// 擦除后的文字颜色。
    pub text_wipe_color: KbpColor,
    /// 擦除后的描边颜色。
    pub outline_wipe_color: KbpColor,
    /// 字体名。
    pub font_name: String,
    /// 字号。
    pub font_size: i32,
    /// 字体标志串，包含 `B`/`I`/`U`/`S` 表示加粗、斜体、下划线、删除线。
    pub font_style: String,
    /// 字符集编号。
    pub charset: i32,
    /// 上下左右 4 个方向的描边宽度。
    pub outlines: [i32; 4],
    /// 水平和垂直 2 个方向的阴影偏移。
    pub shadows: [i32; 2],
    /// 擦除方式编号。
    pub wipe_style: i32,
    /// 全大写标志。
    pub all_caps: String,
    /// 是否为固定（无擦除）样式。
    pub fixed: bool,
}

impl KbpStyle {
    /// 检查 4 个颜色字段是否已解析为颜色代码。
    ///
    /// # Errors
    ///
    /// 字段混用两种表示时返回 [`ConvertError::MixedColorTypes`]。
    pub fn has_resolved_colors(&self) -> Result<bool, ConvertError> {
        let fields = self.color_fields();
        if fields.iter().all(|(_, color)| color.is_resolved()) {
            Ok(true)
        } else if fields.iter().all(|(_, color)| !color.is_resolved()) {
            Ok(false)
        } else {
            let detail = fields
                .iter()
                .map(|(name, color)| format!("\t{name}: {color:?}"))
                .collect::<Vec<_>>()
                .join("\n");
            Err(ConvertError::MixedColorTypes(detail))
        }
    }

    /// 借助调色板把 4 个颜色字段解析为具体颜色代码，返回解析后的副本。
    ///
    /// 对已解析的样式调用是无操作，但会记录一条警告，因为这通常意味着
    /// 调色板没有按预期使用。
    pub fn resolve_colors(&self, palette: &KbpPalette) -> Result<Self, ConvertError> {
        if self.has_resolved_colors()? {
            warn!("样式 {} 的颜色已经解析过，调色板可能未按预期使用", self.name);
            return Ok(self.clone());
        }
        let mut resolved = self.clone();
        resolved.text_color = KbpColor::Rgb(self.text_color.resolve(palette)?.to_string());
        resolved.outline_color = KbpColor::Rgb(self.outline_color.resolve(palette)?.to_string());
        resolved.text_wipe_color =
            KbpColor::Rgb(self.text_wipe_color.resolve(palette)?.to_string());
        resolved.outline_wipe_color =
            KbpColor::Rgb(self.outline_wipe_color.resolve(palette)?.to_string());
        Ok(resolved)
    }

    /// 派生该样式的固定（无擦除）变体。
    ///
    /// 擦除色在固定样式中不会被用到，重定义为未擦除的颜色以便与
    /// 其它格式兼容。对固定样式调用返回自身的副本。
    #[must_use]
    pub fn fixed_variant(&self) -> Self {
        if self.fixed {
            return self.clone();
        }
        let mut fixed = self.clone();
        fixed.name = format!("{}_fixed", self.name);
        fixed.text_wipe_color = self.text_color.clone();
        fixed.outline_wipe_color = self.outline_color.clone();
        fixed.fixed = true;
        fixed
    }

    fn color_fields(&self) -> [(&'static str, &KbpColor); 4] {
        [
            ("text_color", &self.text_color),
            ("outline_color", &self.outline_color),
            ("text_wipe_color", &self.text_wipe_color),
            ("outline_wipe_color", &self.outline_wipe_color),
        ]
    }
}

/// 以带符号整数为键的样式集合。
///
/// 正键表示普通（擦除）样式，负键表示对应的固定（无擦除）变体。
/// 行头中的字母别名与键互相转换：`A`-`Z` 对应 1..=26，`a`-`z` 对应 -1..=-26。
/// 负键对应的样式在首次访问时从正键样式惰性派生并缓存。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KbpStyleCollection {
    styles: HashMap<i32, KbpStyle>,
}

impl KbpStyleCollection {
    /// 把字母别名转换为样式键。非字母输入返回 `None`。
    #[must_use]
    pub fn alpha_to_key(letter: char) -> Option<i32> {
        if letter.is_ascii_uppercase() {
            Some(letter as i32 - 'A' as i32 + 1)
        } else if letter.is_ascii_lowercase() {
            Some(-(letter as i32 - 'a' as i32 + 1))
        } else {
            None
        }
    }

    /// 把样式键转换为字母别名。超出范围的键返回 `None`。
    #[must_use]
    pub fn key_to_alpha(key: i32) -> Option<char> {
        match key {
            1..=26 => char::from_u32(('A' as u32) + (key as u32) - 1),
            -26..=-1 => char::from_u32(('a' as u32) + (-key as u32) - 1),
            _ => None,
        }
    }

    /// 插入一个样式。
    ///
    /// # Errors
    ///
    /// 键不在 [-26,-1]∪[1,26] 内时返回 [`ConvertError::StyleKeyRange`]。
    pub fn insert(&mut self, key: i32, style: KbpStyle) -> Result<(), ConvertError> {
        Self::assert_valid_key(key)?;
        self.styles.insert(key, style);
        Ok(())
    }

    /// 按键查找样式，不触发派生。
    #[must_use]
    pub fn get(&self, key: i32) -> Option<&KbpStyle> {
        self.styles.get(&key)
    }

    /// 按键取出样式；负键缺失时从对应的正键样式派生固定变体并缓存。
    ///
    /// 派生是确定性的：对同一个键的重复调用返回相同的值。
    ///
    /// # Errors
    ///
    /// 键超出范围时返回 [`ConvertError::StyleKeyRange`]；
    /// 键在范围内但样式未定义（且无法派生）时返回
    /// [`ConvertError::InvalidKbpFormat`]。
    pub fn get_or_derive(&mut self, key: i32) -> Result<&KbpStyle, ConvertError> {
        Self::assert_valid_key(key)?;
        if !self.styles.contains_key(&key) && key < 0 {
            let derived = self.styles.get(&-key).map(KbpStyle::fixed_variant);
            if let Some(derived) = derived {
                self.styles.insert(key, derived);
            }
        }
        self.styles
            .get(&key)
            .ok_or_else(|| ConvertError::InvalidKbpFormat(format!("引用了未定义的样式: {key}")))
    }

    /// 按字母别名取出样式，必要时派生固定变体。
    pub fn get_or_derive_by_alpha(&mut self, letter: char) -> Result<&KbpStyle, ConvertError> {
        let key = Self::alpha_to_key(letter).ok_or_else(|| {
            ConvertError::InvalidKbpFormat(format!("无效的样式字母: {letter:?}"))
        })?;
        self.get_or_derive(key)
    }

    /// 返回按升序排列的所有键。
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<i32> {
        let mut keys: Vec<i32> = self.styles.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// 集合中的样式数量。
    #[must_use]
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// 集合是否为空。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    fn assert_valid_key(key: i32) -> Result<(), ConvertError> {
        if (1..=26).contains(&key) || (-26..=-1).contains(&key) {
            Ok(())
        } else {
            Err(ConvertError::StyleKeyRange(key))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_style() -> KbpStyle {
        KbpStyle {
            name: "Default".to_string(),
            text_color: KbpColor::Palette(1),
            outline_color: KbpColor::Palette(2),
            text_wipe_color: KbpColor::Palette(3),
            outline_wipe_color: KbpColor::Palette(4),
            font_name: "Arial".to_string(),
            font_size: 12,
            font_style: "B".to_string(),
            charset: 0,
            outlines: [1, 1, 1, 1],
            shadows: [0, 0],
            wipe_style: 0,
            all_caps: "L".to_string(),
            fixed: false,
        }
    }

    fn sample_palette() -> KbpPalette {
        let codes = [
            "000", "FFF", "F00", "0F0", "00F", "FF0", "0FF", "F0F", "888", "CCC", "400", "040",
            "004", "440", "044", "404",
        ];
        KbpPalette::new(codes.iter().map(ToString::to_string).collect()).unwrap()
    }

    #[test]
    fn test_alpha_key_roundtrip() {
        for letter in ('A'..='Z').chain('a'..='z') {
            let key = KbpStyleCollection::alpha_to_key(letter).unwrap();
            assert_eq!(
                KbpStyleCollection::key_to_alpha(key),
                Some(letter),
                "字母 {letter} 的别名转换应当可逆"
            );
        }
        for key in (-26..=-1).chain(1..=26) {
            let letter = KbpStyleCollection::key_to_alpha(key).unwrap();
            assert_eq!(KbpStyleCollection::alpha_to_key(letter), Some(key));
        }
    }

    #[test]
    fn test_alpha_to_key_rejects_non_letters() {
        assert_eq!(KbpStyleCollection::alpha_to_key('1'), None);
        assert_eq!(KbpStyleCollection::alpha_to_key('!'), None);
        assert_eq!(KbpStyleCollection::key_to_alpha(0), None);
        assert_eq!(KbpStyleCollection::key_to_alpha(27), None);
    }

    #[test]
    fn test_insert_rejects_out_of_range_keys() {
        let mut collection = KbpStyleCollection::default();
        for key in [0, 27, -27] {
            let result = collection.insert(key, sample_style());
            assert!(
                matches!(result, Err(ConvertError::StyleKeyRange(k)) if k == key),
                "键 {key} 应当被拒绝"
            );
        }
        assert!(collection.insert(1, sample_style()).is_ok());
        assert!(collection.insert(-26, sample_style()).is_ok());
    }

    #[test]
    fn test_fixed_style_derivation_is_idempotent() {
        let mut collection = KbpStyleCollection::default();
        collection.insert(1, sample_style()).unwrap();

        let first = collection.get_or_derive(-1).unwrap().clone();
        let second = collection.get_or_derive(-1).unwrap().clone();

        assert_eq!(first, second, "重复派生应当返回相同的样式");
        assert!(first.fixed);
        assert_eq!(first.name, "Default_fixed");
        assert_eq!(first.text_wipe_color, KbpColor::Palette(1));
        assert_eq!(first.outline_wipe_color, KbpColor::Palette(2));
    }

    #[test]
    fn test_derive_without_base_style_fails() {
        let mut collection = KbpStyleCollection::default();
        assert!(matches!(
            collection.get_or_derive(-3),
            Err(ConvertError::InvalidKbpFormat(_))
        ));
    }

    #[test]
    fn test_get_or_derive_by_alpha() {
        let mut collection = KbpStyleCollection::default();
        collection.insert(1, sample_style()).unwrap();

        assert_eq!(collection.get_or_derive_by_alpha('A').unwrap().name, "Default");
        assert_eq!(
            collection.get_or_derive_by_alpha('a').unwrap().name,
            "Default_fixed"
        );
        assert!(collection.get_or_derive_by_alpha('0').is_err());
    }

    #[test]
    fn test_fixed_variant_of_fixed_style() {
        let fixed = sample_style().fixed_variant();
        let again = fixed.fixed_variant();
        assert_eq!(fixed, again, "固定样式的派生应当返回自身");
    }

    #[test]
    fn test_palette_validation() {
        assert!(KbpPalette::new(vec!["000".to_string(); 15]).is_err());
        assert!(KbpPalette::new(vec!["000".to_string(); 17]).is_err());

        let mut codes = vec!["000".to_string(); 16];
        codes[7] = "GGG".to_string();
        assert!(KbpPalette::new(codes).is_err());

        let mut codes = vec!["000".to_string(); 16];
        codes[7] = "fff".to_string();
        assert!(
            KbpPalette::new(codes).is_err(),
            "小写颜色代码应当被拒绝"
        );
    }

    #[test]
    fn test_palette_from_line() {
        let palette = KbpPalette::from_line(
            "  000,FFF,F00,0F0,00F,FF0,0FF,F0F,888,CCC,400,040,004,440,044,404",
        )
        .unwrap();
        assert_eq!(palette.get(0), Some("000"));
        assert_eq!(palette.get(15), Some("404"));
        assert_eq!(palette.get(16), None);
    }

    #[test]
    fn test_resolve_colors() {
        let resolved = sample_style().resolve_colors(&sample_palette()).unwrap();
        assert_eq!(resolved.text_color, KbpColor::Rgb("FFF".to_string()));
        assert_eq!(resolved.outline_color, KbpColor::Rgb("F00".to_string()));
        assert_eq!(resolved.text_wipe_color, KbpColor::Rgb("0F0".to_string()));
        assert_eq!(resolved.outline_wipe_color, KbpColor::Rgb("00F".to_string()));
        assert!(resolved.has_resolved_colors().unwrap());
    }

    #[test]
    fn test_resolve_colors_out_of_range_index() {
        let mut style = sample_style();
        style.text_color = KbpColor::Palette(16);
        assert!(style.resolve_colors(&sample_palette()).is_err());
    }

    #[test]
    fn test_mixed_color_types_are_rejected() {
        let mut style = sample_style();
        style.text_color = KbpColor::Rgb("FFF".to_string());
        assert!(matches!(
            style.has_resolved_colors(),
            Err(ConvertError::MixedColorTypes(_))
        ));
    }
}
