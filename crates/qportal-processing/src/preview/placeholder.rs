//! Placeholder strategy: a single informational page used when no content can
//! be recovered from the source.

use super::error::PreviewError;
use super::layout::{
    DocumentInfo, Font, PageTemplate, TextDocumentBuilder, TextLine, DOCUMENT_AUTHOR,
    DOCUMENT_SUBJECT,
};
use super::source::SourceFile;
use super::RenderedPreview;

const TITLE: &str = "PDF Document Preview";

pub(crate) fn placeholder(
    source: &SourceFile,
    _page_count: u32,
) -> Result<RenderedPreview, PreviewError> {
    let uploaded = source
        .modified
        .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let lines = vec![
        TextLine::centered(TITLE, Font::Bold, 20.0),
        TextLine::blank(12.0),
        TextLine::centered("Preview is not available for this PDF file.", Font::Regular, 12.0),
        TextLine::centered("The file may use unsupported compression.", Font::Regular, 12.0),
        TextLine::blank(12.0),
        TextLine::centered(format!("Original file: {}", source.file_name()), Font::Regular, 11.0),
        TextLine::centered(
            format!("File size: {} bytes", group_thousands(source.size())),
            Font::Regular,
            11.0,
        ),
        TextLine::centered(format!("Upload date: {}", uploaded), Font::Regular, 11.0),
        TextLine::blank(12.0),
        TextLine::centered(
            "Note: Full preview is not available due to PDF compression format.",
            Font::Regular,
            9.0,
        ),
        TextLine::centered(
            "The complete document will be available after purchase.",
            Font::Regular,
            9.0,
        ),
    ];

    let mut builder = TextDocumentBuilder::new(PageTemplate::a4_portrait());
    builder.add_page(lines);
    let bytes = builder.build(&DocumentInfo {
        title: TITLE,
        author: DOCUMENT_AUTHOR,
        subject: DOCUMENT_SUBJECT,
    })?;

    Ok(RenderedPreview {
        bytes,
        pages: 1,
        total_pages: 0,
    })
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
