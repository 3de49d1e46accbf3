//! Terminal and JSON output for a committed turn.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use council_domain::citation::Citation;
use council_domain::turn::{Segment, Turn};

use crate::bootstrap::Submitted;

/// Machine-readable result of `council ask --json`.
#[derive(Debug, Serialize)]
pub struct TurnReport {
    pub session_id: String,
    pub ok: bool,
    pub text: String,
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_fact: Option<String>,
    pub images: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TurnReport {
    pub fn new(submitted: &Submitted, images: Vec<PathBuf>) -> Self {
        let (citations, memory_fact, error) = match &submitted.result {
            Ok(o) => (o.citations.clone(), o.proposed_memory_fact.clone(), None),
            Err(e) => (Vec::new(), None, Some(e.to_string())),
        };
        Self {
            session_id: submitted.session.id.clone(),
            ok: submitted.result.is_ok(),
            text: submitted.message.text(),
            citations,
            memory_fact,
            images,
            error,
        }
    }
}

/// Write every inline image of `message` under `dir`, returning the paths.
///
/// Files are named `<session>-<turn>-<part>.<ext>` so repeated runs never
/// overwrite each other within a session.
pub fn save_images(dir: &Path, session_id: &str, turn_index: usize, message: &Turn) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for (part, segment) in message.segments.iter().enumerate() {
        let Segment::InlineBlob { mime_type, data } = segment else {
            continue;
        };
        if paths.is_empty() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let ext = extension_for(mime_type);
        let path = dir.join(format!("{session_id}-{turn_index}-{part}.{ext}"));
        std::fs::write(&path, data).with_context(|| format!("writing {}", path.display()))?;
        paths.push(path);
    }
    Ok(paths)
}

fn extension_for(mime_type: &str) -> &'static str {
    mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("bin")
}

/// Print the assistant message, image paths and sources.
pub fn print_turn(submitted: &Submitted, images: &[PathBuf]) {
    let text = submitted.message.text();
    if !text.is_empty() {
        if submitted.result.is_ok() {
            println!("{text}");
        } else {
            eprintln!("\x1b[31m{text}\x1b[0m");
        }
    }
    for path in images {
        println!("[image saved to {}]", path.display());
    }
    if let Ok(outcome) = &submitted.result {
        print_citations(&outcome.citations);
        if let Some(fact) = &outcome.proposed_memory_fact {
            eprintln!("\x1b[2m(remembered: {fact})\x1b[0m");
        }
    }
}

fn print_citations(citations: &[Citation]) {
    if citations.is_empty() {
        return;
    }
    println!();
    println!("Sources:");
    for (i, c) in citations.iter().enumerate() {
        println!("  [{}] {} <{}>", i + 1, c.title, c.uri);
    }
}
