//! Text page writer shared by the text reflow and placeholder strategies.
//!
//! Pages are A4 portrait and use the standard Helvetica fonts with
//! WinAnsiEncoding, so no font program is embedded. Characters outside
//! Windows-1252 are written as `?`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::error::PreviewError;

const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Average Helvetica advance width as a fraction of the font size. Used to
/// estimate line widths without font metrics.
const AVERAGE_CHAR_WIDTH: f32 = 0.52;

pub(crate) const LINE_HEIGHT: f32 = 1.4;
pub(crate) const BODY_FONT_SIZE: f32 = 11.0;
pub(crate) const DOCUMENT_AUTHOR: &str = "Q-Manager System";
pub(crate) const DOCUMENT_SUBJECT: &str = "PDF Preview";

/// Physical page geometry in points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PageTemplate {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
}

impl PageTemplate {
    pub fn a4_portrait() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin_left: 15.0 * POINTS_PER_MM,
            margin_right: 15.0 * POINTS_PER_MM,
            margin_top: 16.0 * POINTS_PER_MM,
            margin_bottom: 16.0 * POINTS_PER_MM,
        }
    }

    pub fn usable_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn usable_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Characters per line at `font_size`, estimated from the average glyph width.
    pub fn chars_per_line(&self, font_size: f32) -> usize {
        ((self.usable_width() / (font_size * AVERAGE_CHAR_WIDTH)).floor() as usize).max(1)
    }

    /// Lines per page at `font_size`.
    pub fn lines_per_page(&self, font_size: f32) -> usize {
        ((self.usable_height() / (font_size * LINE_HEIGHT)).floor() as usize).max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone)]
pub(crate) struct TextLine {
    pub text: String,
    pub font: Font,
    pub size: f32,
    pub align: Align,
}

impl TextLine {
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: Font::Regular,
            size: BODY_FONT_SIZE,
            align: Align::Left,
        }
    }

    pub fn centered(text: impl Into<String>, font: Font, size: f32) -> Self {
        Self {
            text: text.into(),
            font,
            size,
            align: Align::Center,
        }
    }

    pub fn blank(size: f32) -> Self {
        Self::centered("", Font::Regular, size)
    }
}

/// Document information dictionary entries.
pub(crate) struct DocumentInfo<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub subject: &'a str,
}

/// Builds a PDF of text-only pages.
pub(crate) struct TextDocumentBuilder {
    template: PageTemplate,
    pages: Vec<Vec<TextLine>>,
}

impl TextDocumentBuilder {
    pub fn new(template: PageTemplate) -> Self {
        Self {
            template,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, lines: Vec<TextLine>) {
        self.pages.push(lines);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn build(self, info: &DocumentInfo<'_>) -> Result<Vec<u8>, PreviewError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for lines in &self.pages {
            let page_id = self.write_page(&mut doc, pages_id, lines)?;
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => media_box(self.template.width, self.template.height),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(encode_win_ansi(info.title)),
            "Author" => Object::string_literal(encode_win_ansi(info.author)),
            "Subject" => Object::string_literal(encode_win_ansi(info.subject)),
            "Producer" => Object::string_literal("qportal"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        doc.compress();
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| PreviewError::OutputWriteFailure(format!("Failed to serialize PDF: {}", e)))?;
        Ok(out)
    }

    fn write_page(
        &self,
        doc: &mut Document,
        pages_id: ObjectId,
        lines: &[TextLine],
    ) -> Result<ObjectId, PreviewError> {
        let template = &self.template;
        let mut operations = Vec::new();
        let mut baseline = template.height - template.margin_top;

        for line in lines {
            baseline -= line.size * LINE_HEIGHT;
            if baseline < template.margin_bottom {
                break;
            }
            if line.text.is_empty() {
                continue;
            }

            let x = match line.align {
                Align::Left => template.margin_left,
                Align::Center => {
                    let estimated =
                        line.text.chars().count() as f32 * line.size * AVERAGE_CHAR_WIDTH;
                    ((template.width - estimated) / 2.0).max(template.margin_left)
                }
            };

            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec![line.font.resource_name().into(), Object::Real(line.size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Real(x), Object::Real(baseline)],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(
                    encode_win_ansi(&line.text),
                    StringFormat::Literal,
                )],
            ));
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| PreviewError::OutputWriteFailure(format!("Failed to encode page: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))
    }
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Real(width),
        Object::Real(height),
    ]
}

/// Greedy word wrap at `max_chars` per line. Paragraph breaks are kept and runs
/// of blank lines collapse to one. Words longer than a line are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push(String::new());
            }
            continue;
        }

        let mut current = String::new();
        for word in words {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            let word: String = word.into_iter().collect();
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Encode text as Windows-1252 for the standard fonts. Control characters are
/// dropped and anything outside the code page becomes `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '•' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
