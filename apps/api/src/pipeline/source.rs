use bytes::Bytes;

/// The original source, ready to be served as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSourceDownload {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub filename: &'static str,
}

/// Pass-through download of the source. The bytes are never transformed.
pub fn download_raw_source(source: &str, is_markup: bool) -> RawSourceDownload {
    let (content_type, filename) = if is_markup {
        ("application/x-latex", "resume.tex")
    } else {
        ("text/plain; charset=utf-8", "resume.txt")
    };
    RawSourceDownload {
        bytes: Bytes::copy_from_slice(source.as_bytes()),
        content_type,
        filename,
    }
}
