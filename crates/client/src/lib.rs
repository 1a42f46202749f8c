//! Client code for pagedate.
//!
//! This crate provides the deterministic date extraction engine and the LLM
//! alternate extractor shared by the server and CLI.

pub mod extract;
pub mod llm;

pub use extract::{
    DateExtractor, DateInference, Document, ExtractConfig, Extractor, Field, HeuristicInference, Strategy, Waterfall,
    aggregate, extract_dates, normalize,
};

pub use llm::{ChatTransport, HttpChatTransport, LlmDateExtractor, LlmError, parse_reply};
