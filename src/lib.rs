//! # KBP Processor: A Parser and ASS Converter for Karaoke Builder Studio Projects
//!
//! This crate provides tools for handling `.kbp` project files produced by
//! Karaoke Builder Studio. It offers a line-oriented parser that turns a
//! project file into a structured, validated document model carrying
//! per-syllable wipe timing, visual styling and on-screen positioning, and a
//! converter that maps that model into an Advanced SubStation Alpha (`.ass`)
//! subtitle document with `\kf` highlight markup.
//!
//! The two primary functions you will use are:
//! - [`parse_kbp`]: Converts KBP file content into a [`model::KbpFile`].
//! - [`generate_ass`]: Creates an ASS subtitle string from a parsed project.
//!
//! ## ⚠️ Important: Synced Projects Only
//!
//! Tracks must be fully synced in Karaoke Builder Studio before they can be
//! converted. Parsing a project whose track status is not synced fails with
//! [`ConvertError::UnsupportedTrackState`].
//!
//! ## Examples
//!
//! ```rust
//! use kbp_processor::{parse_kbp, generate_ass, AssOptions, KbpParsingOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let kbp_content = "\
//! -----------------------------
//! HEADERV2
//! 'Palette Colours
//!   000,FFF,F00,0F0,00F,FF0,0FF,F0F,888,CCC,400,040,004,440,044,404
//! 'Styles
//!   Style00,Default,1,2,3,4
//!   Arial,12,B,0
//!   1,1,1,1,0,0,0,L
//!
//!   StyleEnd
//! 'Margins
//!   2,2,8,12
//! 'Other
//!   5,1
//! '--- Track Information ---
//! Status     1
//! Title      Example
//! -----------------------------
//! PAGEV2
//! C/A/100/500/0/0/0
//! Hi /100/200/0
//! there/205/500/0
//!
//! -----------------------------
//! ";
//!
//!     // 1. Parse the project into structured data
//!     let file = parse_kbp(kbp_content, &KbpParsingOptions::default())?;
//!     assert_eq!(file.pages.len(), 1);
//!     assert_eq!(file.pages[0].lines[0].syllables[0].text, "Hi ");
//!
//!     // 2. Generate an ASS document from the parsed project
//!     let ass = generate_ass(&file, &AssOptions::default())?;
//!     assert!(ass.contains("[Events]"));
//!     assert!(ass.contains(r"{\kf100}"));
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod font_metrics;
pub mod generator;
pub mod model;
pub mod parser;

pub use config::{AssOffset, AssOptions, KbpParsingOptions, TextExtractionOptions};
pub use error::ConvertError;
pub use generator::{AssDocument, convert_to_ass, generate_ass};
pub use parser::parse_kbp;
