//! Minimal PDF 1.4 writer for text-only documents.
//!
//! Only the standard base-14 fonts are used, so nothing is embedded. Text is
//! word-wrapped with a per-font average glyph width and flows onto new pages
//! when the bottom margin is reached. Latin-1 text is written as WinAnsi octal
//! escapes, so the serialized document stays ASCII.

use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 612.0; // US letter, points
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const LEADING: f32 = 1.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseFont {
    Helvetica,
    TimesRoman,
    Courier,
}

impl BaseFont {
    fn pdf_name(self) -> &'static str {
        match self {
            BaseFont::Helvetica => "Helvetica",
            BaseFont::TimesRoman => "Times-Roman",
            BaseFont::Courier => "Courier",
        }
    }

    /// Average advance width as a fraction of the font size.
    fn avg_char_width(self) -> f32 {
        match self {
            BaseFont::Helvetica => 0.5,
            BaseFont::TimesRoman => 0.45,
            BaseFont::Courier => 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    size: f32,
    align: Align,
}

/// Accumulates lines of text, then lays them out into pages on `build`.
#[derive(Debug, Clone)]
pub struct PdfBuilder {
    font: BaseFont,
    body_size: f32,
    lines: Vec<Line>,
}

impl PdfBuilder {
    pub fn new(font: BaseFont, body_size: f32) -> Self {
        Self {
            font,
            body_size,
            lines: Vec::new(),
        }
    }

    /// A single line at `size`, wrapped if it is too wide.
    pub fn line(mut self, text: &str, size: f32) -> Self {
        self.push_wrapped(text, size, Align::Left);
        self
    }

    /// Body text. Embedded newlines start new lines; each is wrapped.
    pub fn paragraph(mut self, text: &str) -> Self {
        let size = self.body_size;
        for raw in text.lines() {
            if raw.trim().is_empty() {
                self.lines.push(blank(size));
            } else {
                self.push_wrapped(raw, size, Align::Left);
            }
        }
        self
    }

    pub fn right_aligned(mut self, text: &str) -> Self {
        let size = self.body_size;
        self.push_wrapped(text, size, Align::Right);
        self
    }

    pub fn bullets<S: AsRef<str>>(mut self, items: &[S]) -> Self {
        let size = self.body_size;
        for item in items {
            self.push_wrapped(&format!("- {}", item.as_ref()), size, Align::Left);
        }
        self
    }

    pub fn gap(mut self, count: usize) -> Self {
        let size = self.body_size;
        self.lines.extend((0..count).map(|_| blank(size)));
        self
    }

    fn push_wrapped(&mut self, text: &str, size: f32, align: Align) {
        let text = to_win_ansi(text);
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * self.font.avg_char_width()))
            .floor()
            .max(1.0) as usize;
        for wrapped in wrap(&text, max_chars) {
            self.lines.push(Line {
                text: wrapped,
                size,
                align,
            });
        }
    }

    /// Lays the lines out and serializes the document.
    pub fn build(&self) -> Vec<u8> {
        let pages = self.paginate();
        write_document(self.font, &pages)
    }

    fn paginate(&self) -> Vec<String> {
        let mut pages = Vec::new();
        let mut content = String::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        for line in &self.lines {
            let advance = line.size * LEADING;
            if y - advance < MARGIN && y < PAGE_HEIGHT - MARGIN {
                pages.push(std::mem::take(&mut content));
                y = PAGE_HEIGHT - MARGIN;
            }
            y -= advance;
            if line.text.is_empty() {
                continue;
            }
            let x = match line.align {
                Align::Left => MARGIN,
                Align::Right => {
                    let width = line.text.chars().count() as f32
                        * line.size
                        * self.font.avg_char_width();
                    (PAGE_WIDTH - MARGIN - width).max(MARGIN)
                }
            };
            let _ = writeln!(
                content,
                "BT /F1 {:.1} Tf {:.2} {:.2} Td ({}) Tj ET",
                line.size,
                x,
                y,
                escape(&line.text)
            );
        }

        if !content.is_empty() || pages.is_empty() {
            pages.push(content);
        }
        pages
    }
}

fn blank(size: f32) -> Line {
    Line {
        text: String::new(),
        size,
        align: Align::Left,
    }
}

/// Object layout: 1 catalog, 2 page tree, 3 font, then (page, content) pairs.
fn write_document(font: BaseFont, pages: &[String]) -> Vec<u8> {
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 4 + i * 2).collect();
    let kids = page_ids
        .iter()
        .map(|id| format!("{id} 0 R"))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
        format!(
            "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
            font.pdf_name()
        ),
    ];
    for (content, page_id) in pages.iter().zip(&page_ids) {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", i + 1);
    }

    let xref_offset = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    );
    out.into_bytes()
}

/// Greedy word wrap. Words longer than `max_chars` are hard-split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }
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
    lines
}

/// Keeps printable ASCII and Latin-1 (WinAnsi shares those code points), maps
/// common typographic characters to ASCII, and shows anything else as `?`.
/// Control characters are dropped.
fn to_win_ansi(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2013}' | '\u{2014}' | '\u{2022}' => Some('-'),
            '\t' => Some(' '),
            c if (' '..='~').contains(&c) => Some(c),
            c if ('\u{A0}'..='\u{FF}').contains(&c) => Some(c),
            c if c.is_control() => None,
            _ => Some('?'),
        })
        .collect()
}

/// String-literal escaping. Anything above ASCII is written as an octal byte.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_ascii() => out.push(c),
            c => {
                let _ = write!(out, "\\{:03o}", u32::from(c) & 0xFF);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_document_has_header_and_trailer() {
        let pdf = as_text(&PdfBuilder::new(BaseFont::Helvetica, 10.0).paragraph("Hello").build());
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.contains("(Hello) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = PdfBuilder::new(BaseFont::Courier, 10.0)
            .line("Title", 16.0)
            .paragraph("Body")
            .build();
        let pdf = as_text(&bytes);
        let xref_at = pdf.find("xref\n").unwrap();
        let entries: Vec<usize> = pdf[xref_at..]
            .lines()
            .skip(3) // "xref", "0 N", free entry
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 5);
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }
        let startxref: usize = pdf
            .split("startxref\n")
            .nth(1)
            .and_then(|s| s.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref_at);
    }

    #[test]
    fn test_long_text_flows_onto_multiple_pages() {
        let body = (0..100).map(|i| format!("Line {i}")).collect::<Vec<_>>().join("\n");
        let pdf = as_text(&PdfBuilder::new(BaseFont::Helvetica, 10.0).paragraph(&body).build());
        assert!(pdf.contains("/Count 3"));
    }

    #[test]
    fn test_empty_document_still_has_one_page() {
        let pdf = as_text(&PdfBuilder::new(BaseFont::TimesRoman, 11.0).build());
        assert!(pdf.contains("/Count 1"));
    }

    #[test]
    fn test_escape_parens_and_backslash() {
        assert_eq!(escape(r"a(b)\c"), r"a\(b\)\\c");
    }

    #[test]
    fn test_non_ascii_is_mapped_or_substituted() {
        assert_eq!(to_win_ansi("“Led” — team • ok ✓"), "\"Led\" - team - ok ?");
        assert_eq!(to_win_ansi("a\u{7}b"), "ab");
    }

    #[test]
    fn test_latin1_is_written_as_win_ansi_octal() {
        let pdf = as_text(
            &PdfBuilder::new(BaseFont::Helvetica, 10.0)
                .paragraph("José Müller, résumé")
                .build(),
        );
        assert!(pdf.contains(r"(Jos\351 M\374ller, r\351sum\351) Tj"));
        assert!(pdf.is_ascii());
    }

    #[test]
    fn test_wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_splits_overlong_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
