//! Generation output: sanitizing what a language-model generator returns before it
//! reaches the render pipeline.
//!
//! The generator itself is an external collaborator behind `ResumeGenerator`; this
//! module only owns the cleanup contract.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::markup::{collapse_blank_lines, looks_like_markup};
use crate::models::Profile;
use crate::pipeline::ExternalServiceError;

/// Generator output after sanitizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSource {
    pub text: String,
    pub is_markup: bool,
}

/// Produces a résumé source for a job description and a candidate profile.
///
/// Implementations return the model's raw text; callers run it through
/// [`sanitize_generated`] before rendering.
#[async_trait]
pub trait ResumeGenerator: Send + Sync {
    async fn generate(&self, job_description: &str, profile: &Profile) -> Result<String, ExternalServiceError>;
}

// ── Code fences ─────────────────────────────────────────────────────────────

static RE_FENCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*```[A-Za-z]*[ \t]*$\n?").unwrap());

// ── Methodology chatter ─────────────────────────────────────────────────────

static RE_METHODOLOGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:using the STAR (?:format|method|technique)|STAR (?:technique|method|format)|\(?Situation, Task, Action, Result\)?)[:.,]?",
    )
    .unwrap()
});

// ── Document extraction ─────────────────────────────────────────────────────

static RE_FULL_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\documentclass.*?\\end\{document\}").unwrap());

static RE_DOCUMENT_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\\begin\{document\}.*?\\end\{document\}").unwrap());

static RE_BOLD_MARKERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*").unwrap());

static RE_SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Cleans raw generator output and decides whether it is markup.
///
/// Removes code fences, `**` markers and methodology phrases, then keeps only the
/// `\documentclass … \end{document}` span (or the bare document body) when present.
pub fn sanitize_generated(raw: &str) -> GeneratedSource {
    let text = RE_FENCE_LINE.replace_all(raw, "");
    let text = RE_BOLD_MARKERS.replace_all(&text, "");
    let text = RE_METHODOLOGY.replace_all(&text, "");
    let text = RE_SPACE_RUNS.replace_all(&text, " ");

    let extracted = RE_FULL_DOCUMENT
        .find(&text)
        .or_else(|| RE_DOCUMENT_BODY.find(&text))
        .map(|m| m.as_str().to_string());

    match extracted {
        Some(document) => GeneratedSource {
            text: document,
            is_markup: true,
        },
        None => {
            let is_markup = looks_like_markup(&text);
            GeneratedSource {
                text: collapse_blank_lines(text.trim()),
                is_markup,
            }
        }
    }
}
