//! Medical Report Analyzer Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック

pub mod types;
pub mod error;
pub mod payload;
pub mod prompts;
pub mod gemini;
pub mod parser;
pub mod markup;
pub mod render;
pub mod orchestrator;
pub mod session;

#[cfg(test)]
mod testing;

pub use types::{EncodedImage, ExtractionResult, UploadedImage, Variant};
pub use error::{Error, Result};
pub use payload::{encode_to_payload, to_data_url, ACCEPTED_MIME_TYPES};
pub use gemini::{GeminiClient, GeminiRequest, HttpReply, Transport};
pub use parser::{extract_json, parse_extraction_text};
pub use markup::{Markup, MarkupNode, Tag};
pub use render::{render_document, render_text, Block, Entry, Line, ListItem};
pub use orchestrator::{AttemptReport, Orchestrator};
pub use session::{AttemptTicket, PendingAttempt, SelectionTicket, Session, SessionStatus};
