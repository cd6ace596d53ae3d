//! 端到端测试：解析 KBP 工程并生成 ASS 字幕。

use kbp_processor::{
    AssOptions, ConvertError, KbpParsingOptions, TextExtractionOptions, convert_to_ass,
    generate_ass, parse_kbp,
};

const SAMPLE_KBP: &str = "\
-----------------------------
HEADERV2
'Palette Colours
  000,FFF,F00,0F0,00F,FF0,0FF,F0F,888,CCC,400,040,004,440,044,404
'Styles
  Style00,Default,1,0,2,0
  Arial,12,B,0
  1,1,1,1,0,0,0,L

  StyleEnd
'Margins
  2,2,8,12
'Other
  5,1
'--- Track Information ---
Status     1
Title      Test Song
Artist     Tester
-----------------------------
PAGEV2
C/A/100/500/0/0/0
Hi /100/200/0
there/205/500/0

L/a/600/900/0/0/0
Plain text/600/900/0

-----------------------------
";

#[test]
fn test_full_conversion_pipeline() {
    let file = parse_kbp(SAMPLE_KBP, &KbpParsingOptions::default()).unwrap();
    let ass = generate_ass(&file, &AssOptions::default()).unwrap();

    assert!(ass.contains("[Script Info]"));
    assert!(ass.contains("Title: Test Song"));
    assert!(ass.contains("ScriptType: v4.00+"));
    assert!(ass.contains("PlayResX: 300"));
    assert!(ass.contains("PlayResY: 216"));

    // 两个被引用的样式：普通样式和惰性派生的固定变体
    assert!(ass.contains("Style: Style01_Default,Arial,"));
    assert!(ass.contains("Style: Style01_Default_fixed,Arial,"));

    // 第一行：居中、带定位淡入淡出和逐音节高亮
    assert!(ass.contains(
        r"Dialogue: 0,0:00:01.00,0:00:05.00,Style01_Default,,0,0,0,karaoke,{\pos(150,20)}{\fad(300,200)}{\kf100}Hi {\k5}{\kf295}there"
    ));
    // 第二行：固定样式输出纯文本
    assert!(ass.contains(
        r"Dialogue: 0,0:00:06.00,0:00:09.00,Style01_Default_fixed,,0,0,0,karaoke,Plain text"
    ));
}

#[test]
fn test_conversion_is_repeatable() {
    // 固定样式的派生不改动输入，重复转换得到相同结果
    let file = parse_kbp(SAMPLE_KBP, &KbpParsingOptions::default()).unwrap();
    let first = convert_to_ass(&file, &AssOptions::default()).unwrap();
    let second = convert_to_ass(&file, &AssOptions::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fade_options_reach_output() {
    let file = parse_kbp(SAMPLE_KBP, &KbpParsingOptions::default()).unwrap();
    let options = AssOptions {
        fade_in: 10,
        fade_out: 20,
        ..AssOptions::default()
    };
    let ass = generate_ass(&file, &options).unwrap();
    assert!(ass.contains(r"{\fad(10,20)}"));
}

#[test]
fn test_unsynced_project_produces_no_file() {
    let content = SAMPLE_KBP.replace("Status     1", "Status     0");
    match parse_kbp(&content, &KbpParsingOptions::default()) {
        Err(ConvertError::UnsupportedTrackState(_)) => {}
        other => panic!("未同步的工程应当解析失败，实际为 {other:?}"),
    }
}

#[test]
fn test_text_extraction_for_resync() {
    let file = parse_kbp(SAMPLE_KBP, &KbpParsingOptions::default()).unwrap();
    let options = TextExtractionOptions {
        syllable_separator: "/".to_string(),
        space_is_separator: true,
        ..TextExtractionOptions::default()
    };
    assert_eq!(file.text(&options), "Hi there\nPlain_text");
}
