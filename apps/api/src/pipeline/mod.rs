//! Render pipeline: remote compile → local layout → minimal fallback.
//!
//! `produce` never fails. Each stage that gives up records why in
//! `RenderOutput::failures` and hands over to the next one; the last stage cannot fail.
//!
//! # spawn_blocking pattern
//! Parsing, layout and PDF serialization are CPU-bound. The local stage runs them in
//! `tokio::task::spawn_blocking` on owned data; a panic there surfaces as a
//! `JoinError` and is treated like any other render failure.

pub mod remote;
pub mod source;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::layout::{render, FontFamily, Page, PageGeometry, RenderError};
use crate::markup::parse_markup;
use crate::models::{Document, Item, Section};
use crate::output::{write_pdf, PDF_MAGIC};
use crate::plaintext::{sectionize, strip_markdown_emphasis};

pub use remote::{ExternalServiceError, HttpCompileClient, RemoteCompiler};
pub use source::{download_raw_source, RawSourceDownload};

pub const DEFAULT_TITLE: &str = "Resume";
pub const FALLBACK_LINES: [&str; 2] = [
    "The resume could not be properly rendered.",
    "You can download the original source instead.",
];
const FALLBACK_SECTION_TITLE: &str = "Rendering unavailable";

// ────────────────────────────────────────────────────────────────────────────
// Request / output types
// ────────────────────────────────────────────────────────────────────────────

/// Which stage produced the final blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStage {
    Remote,
    Local,
    Fallback,
}

impl RenderStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
            Self::Fallback => "fallback",
        }
    }
}

/// Header values that replace whatever the source itself carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderOverride {
    pub name: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub source: String,
    pub is_markup: bool,
    #[serde(default)]
    pub header: Option<HeaderOverride>,
}

impl RenderRequest {
    pub fn new(source: impl Into<String>, is_markup: bool) -> Self {
        Self {
            source: source.into(),
            is_markup,
            header: None,
        }
    }

    pub fn with_header(mut self, header: HeaderOverride) -> Self {
        self.header = Some(header);
        self
    }
}

/// Result of one render call. Carries the input source so the raw download is always
/// available next to the blob.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub render_id: Uuid,
    pub blob: Bytes,
    pub stage: RenderStage,
    /// Unknown when the remote service produced the blob.
    pub page_count: Option<usize>,
    /// Why earlier stages were skipped, in order. Diagnostics only.
    pub failures: Vec<String>,
    pub source: String,
    pub is_markup: bool,
    pub rendered_at: DateTime<Utc>,
}

impl RenderOutput {
    pub fn raw_source(&self) -> RawSourceDownload {
        download_raw_source(&self.source, self.is_markup)
    }
}

/// Per-deployment render settings.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub geometry: PageGeometry,
    pub font: FontFamily,
    pub remote_timeout: Duration,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            font: FontFamily::Helvetica,
            remote_timeout: Duration::from_secs(15),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document building
// ────────────────────────────────────────────────────────────────────────────

/// Builds the document model for a source, applying any header override.
pub fn build_document(source: &str, is_markup: bool, header: Option<&HeaderOverride>) -> Document {
    let mut doc = if is_markup {
        parse_markup(source)
    } else {
        sectionize(&strip_markdown_emphasis(source))
    };

    if let Some(header) = header {
        if let Some(name) = header.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            doc.name = Some(name.to_string());
        }
        if let Some(contact) = header.contact.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            doc.contact = Some(contact.to_string());
        }
    }
    doc
}

/// Parse, lay out and serialize. Runs on a blocking thread.
fn render_locally(request: &RenderRequest, settings: &RenderSettings) -> Result<(Vec<u8>, usize), RenderError> {
    let doc = build_document(&request.source, request.is_markup, request.header.as_ref());
    debug!(sections = doc.sections.len(), items = doc.item_count(), "Document built");
    let pages = render(&doc, &settings.geometry, settings.font)?;
    let title = doc.name.as_deref().unwrap_or(DEFAULT_TITLE);
    Ok((write_pdf(&pages, &settings.geometry, title), pages.len()))
}

/// The apology document shown when local rendering fails.
pub fn fallback_document(source_len: usize) -> Document {
    let mut items: Vec<Item> = FALLBACK_LINES.iter().map(|l| Item::plain(*l)).collect();
    items.push(Item::plain(format!("Original source: {source_len} bytes")));
    Document {
        name: Some(DEFAULT_TITLE.to_string()),
        contact: None,
        sections: vec![Section {
            title: FALLBACK_SECTION_TITLE.to_string(),
            items,
        }],
    }
}

/// Lays out the fallback document. Falls back to A4 if the configured geometry is
/// unusable, and to a blank page if even that fails.
fn render_fallback(source_len: usize, settings: &RenderSettings) -> Vec<u8> {
    let geometry = if settings.geometry.validate().is_ok() {
        settings.geometry
    } else {
        PageGeometry::a4()
    };
    let pages = render(&fallback_document(source_len), &geometry, settings.font)
        .unwrap_or_else(|_| vec![Page::new(1)]);
    write_pdf(&pages, &geometry, DEFAULT_TITLE)
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Owns the render settings and the optional remote compiler.
/// Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct RenderPipeline {
    remote: Option<Arc<dyn RemoteCompiler>>,
    settings: RenderSettings,
}

impl RenderPipeline {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            remote: None,
            settings,
        }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteCompiler>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Renders `source` without a header override.
    pub async fn produce(&self, source: &str, is_markup: bool) -> RenderOutput {
        self.produce_request(RenderRequest::new(source, is_markup)).await
    }

    pub async fn produce_request(&self, request: RenderRequest) -> RenderOutput {
        let render_id = Uuid::new_v4();
        let mut failures = Vec::new();

        // Stage 1: remote compile, markup only.
        if let (Some(remote), true) = (self.remote.as_ref(), request.is_markup) {
            match self.compile_remote(remote.as_ref(), &request.source).await {
                Ok(blob) => {
                    info!(%render_id, stage = "remote", bytes = blob.len(), service = remote.name(), "Render complete");
                    return self.output(render_id, blob, RenderStage::Remote, None, failures, request);
                }
                Err(e) => {
                    warn!(%render_id, stage = "remote", error = %e, "Remote compile failed, rendering locally");
                    failures.push(format!("remote: {e}"));
                }
            }
        }

        // Stage 2: local layout on a blocking thread.
        let job = request.clone();
        let settings = self.settings;
        let local = tokio::task::spawn_blocking(move || render_locally(&job, &settings))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))
            .and_then(|result| result);

        match local {
            Ok((pdf, pages)) => {
                info!(%render_id, stage = "local", pages, bytes = pdf.len(), "Render complete");
                self.output(render_id, Bytes::from(pdf), RenderStage::Local, Some(pages), failures, request)
            }
            Err(e) => {
                error!(%render_id, stage = "local", error = %e, "Local render failed, using fallback document");
                failures.push(format!("local: {e}"));
                let pdf = render_fallback(request.source.len(), &self.settings);
                self.output(render_id, Bytes::from(pdf), RenderStage::Fallback, Some(1), failures, request)
            }
        }
    }

    async fn compile_remote(&self, remote: &dyn RemoteCompiler, source: &str) -> Result<Bytes, ExternalServiceError> {
        let timeout = self.settings.remote_timeout;
        let blob = tokio::time::timeout(timeout, remote.compile(source))
            .await
            .map_err(|_| ExternalServiceError::Timeout {
                secs: timeout.as_secs(),
            })??;

        if !blob.starts_with(PDF_MAGIC) {
            return Err(ExternalServiceError::InvalidBody(format!(
                "expected a PDF, got {} bytes without the PDF header",
                blob.len()
            )));
        }
        Ok(blob)
    }

    fn output(
        &self,
        render_id: Uuid,
        blob: Bytes,
        stage: RenderStage,
        page_count: Option<usize>,
        failures: Vec<String>,
        request: RenderRequest,
    ) -> RenderOutput {
        RenderOutput {
            render_id,
            blob,
            stage,
            page_count,
            failures,
            source: request.source,
            is_markup: request.is_markup,
            rendered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::markup::builder::IMPLICIT_SECTION_TITLE;

    const MARKUP: &str = r"\begin{document}
\section{Experience}
  \resumeSubheading{Engineer}{2020 -- 2022}{Acme}{Remote}
  \resumeItem{Led X}
\end{document}";

    enum Behaviour {
        Pdf,
        NotPdf,
        Slow,
        Fail,
    }

    struct FakeRemote(Behaviour);

    #[async_trait]
    impl RemoteCompiler for FakeRemote {
        async fn compile(&self, _source: &str) -> Result<Bytes, ExternalServiceError> {
            match self.0 {
                Behaviour::Pdf => Ok(Bytes::from_static(b"%PDF-1.5 remote")),
                Behaviour::NotPdf => Ok(Bytes::from_static(b"<html>error</html>")),
                Behaviour::Slow => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Bytes::from_static(b"%PDF-1.5 late"))
                }
                Behaviour::Fail => Err(ExternalServiceError::Status {
                    status: 500,
                    message: "boom".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn pipeline_with(behaviour: Behaviour) -> RenderPipeline {
        let settings = RenderSettings {
            remote_timeout: Duration::from_millis(50),
            ..RenderSettings::default()
        };
        RenderPipeline::new(settings).with_remote(Arc::new(FakeRemote(behaviour)))
    }

    #[tokio::test]
    async fn test_local_stage_without_remote() {
        let out = RenderPipeline::new(RenderSettings::default()).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Local);
        assert!(out.blob.starts_with(PDF_MAGIC));
        assert_eq!(out.page_count, Some(1));
        assert!(out.failures.is_empty());
        assert_eq!(out.source, MARKUP);
    }

    #[tokio::test]
    async fn test_remote_success_returned_directly() {
        let out = pipeline_with(Behaviour::Pdf).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Remote);
        assert_eq!(out.blob.as_ref(), b"%PDF-1.5 remote");
        assert_eq!(out.page_count, None);
    }

    #[tokio::test]
    async fn test_remote_timeout_falls_through_to_local() {
        let out = pipeline_with(Behaviour::Slow).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Local);
        assert!(!out.blob.is_empty());
        assert!(out.failures[0].contains("Timed out"), "{:?}", out.failures);
    }

    #[tokio::test]
    async fn test_remote_non_pdf_counts_as_failure() {
        let out = pipeline_with(Behaviour::NotPdf).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Local);
        assert!(out.failures[0].contains("Invalid response body"));
    }

    #[tokio::test]
    async fn test_remote_error_status_falls_through() {
        let out = pipeline_with(Behaviour::Fail).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Local);
        assert_eq!(out.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_plain_text_skips_remote() {
        let out = pipeline_with(Behaviour::Pdf)
            .produce("SUMMARY\nBuilt X\nEXPERIENCE\nDid Y", false)
            .await;
        assert_eq!(out.stage, RenderStage::Local);
        assert!(out.failures.is_empty());
    }

    #[tokio::test]
    async fn test_local_failure_uses_fallback() {
        let settings = RenderSettings {
            geometry: PageGeometry {
                margin: 400.0,
                ..PageGeometry::a4()
            },
            ..RenderSettings::default()
        };
        let out = RenderPipeline::new(settings).produce(MARKUP, true).await;
        assert_eq!(out.stage, RenderStage::Fallback);
        assert!(out.blob.starts_with(PDF_MAGIC));
        assert_eq!(out.page_count, Some(1));
        assert!(out.failures[0].starts_with("local:"));
        assert_eq!(out.raw_source().bytes.as_ref(), MARKUP.as_bytes());
    }

    #[tokio::test]
    async fn test_empty_source_still_renders() {
        let out = RenderPipeline::new(RenderSettings::default()).produce("", false).await;
        assert_eq!(out.stage, RenderStage::Local);
        assert!(out.blob.starts_with(PDF_MAGIC));
    }

    #[test]
    fn test_build_document_header_override() {
        let header = HeaderOverride {
            name: Some("Ada Lovelace".to_string()),
            contact: Some("  ".to_string()),
        };
        let doc = build_document("**SUMMARY**\nBuilt X", false, Some(&header));
        assert_eq!(doc.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(doc.contact, None);
        assert_eq!(doc.sections[0].title, "SUMMARY");
        assert_eq!(doc.sections[0].items, vec![Item::plain("Built X")]);
    }

    #[test]
    fn test_fallback_document_mentions_source() {
        let doc = fallback_document(1234);
        assert_eq!(doc.name.as_deref(), Some(DEFAULT_TITLE));
        let texts: Vec<&str> = doc.sections[0].items.iter().flat_map(|i| i.leaf_texts()).collect();
        assert_eq!(texts[0], FALLBACK_LINES[0]);
        assert_eq!(texts[1], FALLBACK_LINES[1]);
        assert!(texts[2].contains("1234"));
        assert_ne!(doc.sections[0].title, IMPLICIT_SECTION_TITLE);
    }
}
