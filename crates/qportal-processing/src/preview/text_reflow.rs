//! Text reflow strategy.
//!
//! For sources the page importer cannot handle: extracts plain text per page
//! and lays it out on generic A4 pages, one output page per source page.
//! Images, vector graphics and original layout are lost. Text that does not
//! fit one page is cut off with an ellipsis line.

use std::panic::{self, AssertUnwindSafe};

use super::error::PreviewError;
use super::layout::{
    wrap_text, DocumentInfo, PageTemplate, TextDocumentBuilder, TextLine, BODY_FONT_SIZE,
    DOCUMENT_AUTHOR, DOCUMENT_SUBJECT,
};
use super::source::SourceFile;
use super::RenderedPreview;

const TRUNCATION_MARKER: &str = "…";

pub(crate) fn reflow_text(
    source: &SourceFile,
    page_count: u32,
) -> Result<RenderedPreview, PreviewError> {
    let pages = extract_pages(&source.bytes)?;
    let total_pages = pages.len() as u32;
    if total_pages == 0 {
        return Err(PreviewError::EmptyDocument);
    }
    let pages_to_extract = page_count.clamp(1, total_pages);

    let template = PageTemplate::a4_portrait();
    let mut builder = TextDocumentBuilder::new(template);
    for text in pages.iter().take(pages_to_extract as usize) {
        builder.add_page(layout_page(text, &template));
    }
    let pages_written = builder.page_count() as u32;

    let bytes = builder.build(&DocumentInfo {
        title: "Document Preview",
        author: DOCUMENT_AUTHOR,
        subject: DOCUMENT_SUBJECT,
    })?;

    Ok(RenderedPreview {
        bytes,
        pages: pages_written,
        total_pages,
    })
}

/// Whether the text extractor can parse `bytes` into at least one page.
pub(crate) fn can_extract(bytes: &[u8]) -> bool {
    extract_pages(bytes).is_ok_and(|pages| !pages.is_empty())
}

/// Extract text per page. `pdf_extract` panics on some malformed input, so the
/// call is isolated and a panic is reported as a malformed source.
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, PreviewError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(PreviewError::MalformedSource(format!(
            "Text extraction failed: {}",
            e
        ))),
        Err(_) => Err(PreviewError::MalformedSource(
            "Text extraction panicked on malformed document".to_string(),
        )),
    }
}

fn layout_page(text: &str, template: &PageTemplate) -> Vec<TextLine> {
    let max_lines = template.lines_per_page(BODY_FONT_SIZE);
    let mut wrapped = wrap_text(text, template.chars_per_line(BODY_FONT_SIZE));

    if wrapped.len() > max_lines {
        wrapped.truncate(max_lines.saturating_sub(1));
        wrapped.push(TRUNCATION_MARKER.to_string());
    }

    wrapped.into_iter().map(TextLine::body).collect()
}
