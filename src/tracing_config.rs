//! Tracing configuration for inspecting validation and dispatch decisions.
//!
//! Three output formats are selected by `FLOWGUARD_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: hierarchical indented output via `tracing-tree`
//! - `json`: one JSON object per span or event
//!
//! ## Quick start
//!
//! ```bash
//! # Why did a call pick the candidate it picked?
//! FLOWGUARD_LOG=flowguard_solver::dispatch=debug flowguard calls.json
//!
//! # Every comparator and binder decision, as a tree
//! FLOWGUARD_LOG=trace FLOWGUARD_LOG_FORMAT=tree flowguard calls.json
//! ```
//!
//! The subscriber is only installed when `FLOWGUARD_LOG` (or `RUST_LOG`) is
//! set, so normal runs pay nothing for it.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("FLOWGUARD_LOG_FORMAT").unwrap_or_default())
    }
}

/// `FLOWGUARD_LOG` wins over `RUST_LOG` when both are set.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("FLOWGUARD_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Install the global subscriber. Output goes to stderr so stdout carries
/// only the dispatch report.
pub fn init_tracing() {
    let has_own_log = std::env::var("FLOWGUARD_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_own_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);

            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
