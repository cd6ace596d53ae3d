//! kbp2ass 命令行入口：把 .kbp 工程文件转换为 .ass 字幕文件。

use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kbp_processor::{
    AssOffset, AssOptions, ConvertError, KbpParsingOptions, generate_ass, parse_kbp,
};

/// Convert .kbp to .ass file
#[derive(Parser, Debug)]
#[command(name = "kbp2ass", version, about = "Convert .kbp to .ass file")]
struct Cli {
    /// 淡入时长（毫秒）
    #[arg(long, default_value_t = 300)]
    fade_in: u32,

    /// 淡出时长（毫秒）
    #[arg(long, default_value_t = 200)]
    fade_out: u32,

    /// 透明背景（true/false）
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    transparency: bool,

    /// 全局时间偏移（true/false 或厘秒数）
    #[arg(long, value_parser = parse_offset, default_value = "true")]
    offset: AssOffset,

    /// 输入的 .kbp 文件
    source_file: PathBuf,

    /// 输出的 .ass 文件，省略时写到标准输出
    dest_file: Option<PathBuf>,
}

/// 把字符串解析为布尔或整数形式的偏移选项。
fn parse_offset(value: &str) -> Result<AssOffset, String> {
    match value.to_ascii_uppercase().as_str() {
        "TRUE" => Ok(AssOffset::Auto),
        "FALSE" => Ok(AssOffset::Disabled),
        _ => value
            .parse::<i64>()
            .map(AssOffset::Fixed)
            .map_err(|_| format!("无法解析 offset 值: {value:?}")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), ConvertError> {
    let content = fs::read_to_string(&cli.source_file)?;
    let file = parse_kbp(&content, &KbpParsingOptions::default())?;

    let options = AssOptions {
        fade_in: cli.fade_in,
        fade_out: cli.fade_out,
        transparency: cli.transparency,
        offset: cli.offset,
    };
    let ass = generate_ass(&file, &options)?;

    match &cli.dest_file {
        // 写文件时带 UTF-8 BOM，与 KBS 生态的其它工具保持一致
        Some(path) => fs::write(path, format!("\u{feff}{ass}"))?,
        None => print!("{ass}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset_values() {
        assert_eq!(parse_offset("true"), Ok(AssOffset::Auto));
        assert_eq!(parse_offset("FALSE"), Ok(AssOffset::Disabled));
        assert_eq!(parse_offset("-25"), Ok(AssOffset::Fixed(-25)));
        assert!(parse_offset("sometimes").is_err());
    }

    #[test]
    fn test_cli_defaults_match_converter_defaults() {
        let cli = Cli::parse_from(["kbp2ass", "song.kbp"]);
        let defaults = AssOptions::default();
        assert_eq!(cli.fade_in, defaults.fade_in);
        assert_eq!(cli.fade_out, defaults.fade_out);
        assert_eq!(cli.transparency, defaults.transparency);
        assert_eq!(cli.offset, defaults.offset);
        assert!(cli.dest_file.is_none());
    }
}
