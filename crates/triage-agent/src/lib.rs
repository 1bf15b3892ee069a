//! Surefire failure triage agent.
//!
//! Wraps `triage-core` with configuration, the analyze/suggest pipeline and a
//! client for an OpenAI-compatible chat completions endpoint.

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod fix_client;
pub mod pipeline;
pub mod prompt;
pub mod reply_parser;

pub use config::{EndpointConfig, TriageConfig};
pub use fix_client::{ChatCompletionsClient, FixClientError, FixSuggester};
pub use pipeline::{recovery_hint, Analysis, Pipeline};
pub use reply_parser::{parse_reply, render_fix_summary, FixReport, LineRef, SuggestedFix};
