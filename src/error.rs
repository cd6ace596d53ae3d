use std::{fmt, io};

use thiserror::Error;

/// 定义 KBP 解析和 ASS 生成过程中可能发生的各种错误。
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 整数解析错误。
    #[error("解析错误: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
    /// 输入不符合 KBP 文件语法。
    #[error("无效的 KBP 格式: {0}")]
    InvalidKbpFormat(String),
    /// 解析结束时缺少必需的节。
    #[error("无效的 KBP 文件，缺少以下节: {0}")]
    MissingSections(String),
    /// 工程尚未完成同步，无法用于转换。
    #[error("不支持的轨道状态: {0}")]
    UnsupportedTrackState(String),
    /// 样式键超出 [-26,-1]∪[1,26] 的范围。
    #[error("无效的样式键: {0}")]
    StyleKeyRange(i32),
    /// 样式的 4 个颜色字段混用了调色板索引和已解析颜色。
    #[error("样式颜色字段类型不一致:\n{0}")]
    MixedColorTypes(String),
    /// 字符串格式化错误。
    #[error("格式错误: {0}")]
    Format(#[from] fmt::Error),
    /// 文件读写等IO错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
}

impl From<ConvertError> for std::io::Error {
    fn from(err: ConvertError) -> Self {
        std::io::Error::other(err)
    }
}
