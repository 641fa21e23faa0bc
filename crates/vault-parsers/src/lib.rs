//! Parsers: provider-specific normalization of raw export bytes into the
//! shared `{Thread, Message}` shape, behind one small dispatch table.

pub mod chatgpt_html;
pub mod chatgpt_json;
pub mod claude_json;
pub mod dispatch;
pub mod gemini_json;
pub mod parser;
pub mod timestamp;

pub use dispatch::{default_parser_for_provider, select_parser};
pub use parser::Parser;
