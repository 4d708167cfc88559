use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use eyre::{Result, bail};
use log::{debug, info};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

const MM_TO_PT: f32 = 72.0 / 25.4;

/// Page geometry and type settings, in millimetres and points
#[derive(Debug, Clone, Copy)]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub font_size: f32,
    pub line_spacing: f32,
}

impl Default for PdfLayout {
    fn default() -> Self {
        // A4
        Self {
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 15.0,
            font_size: 11.0,
            line_spacing: 1.15,
        }
    }
}

impl PdfLayout {
    fn page_width(&self) -> f32 {
        self.page_width_mm * MM_TO_PT
    }

    fn page_height(&self) -> f32 {
        self.page_height_mm * MM_TO_PT
    }

    fn margin(&self) -> f32 {
        self.margin_mm * MM_TO_PT
    }

    fn usable_width(&self) -> f32 {
        self.page_width() - 2.0 * self.margin()
    }

    fn leading(&self) -> f32 {
        self.font_size * self.line_spacing
    }

    fn lines_per_page(&self) -> usize {
        let usable = self.page_height() - 2.0 * self.margin();
        ((usable / self.leading()).floor() as usize).max(1)
    }
}

/// `youtube_summary_YYYY-MM-DD.pdf`
pub fn pdf_filename(date: NaiveDate) -> String {
    format!("youtube_summary_{}.pdf", date.format("%Y-%m-%d"))
}

/// Writes plain text into a paginated Helvetica PDF
#[derive(Debug, Clone)]
pub struct PdfExporter {
    layout: PdfLayout,
    output_dir: PathBuf,
}

impl PdfExporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            layout: PdfLayout::default(),
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn with_layout(mut self, layout: PdfLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Write `text` to `<output_dir>/youtube_summary_<date>.pdf`
    pub fn export(&self, text: &str, date: NaiveDate) -> Result<PathBuf> {
        if text.trim().is_empty() {
            bail!("refusing to export an empty document");
        }

        let bytes = self.render(text)?;
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(pdf_filename(date));
        std::fs::write(&path, bytes)?;

        info!("PDF written to {}", path.display());
        Ok(path)
    }

    pub fn render(&self, text: &str) -> Result<Vec<u8>> {
        let layout = &self.layout;
        let lines = wrap_text(text, layout.usable_width(), layout.font_size);
        let blank: &[String] = &[];
        let pages: Vec<&[String]> = if lines.is_empty() {
            vec![blank]
        } else {
            lines.chunks(layout.lines_per_page()).collect()
        };
        debug!("Rendering {} lines on {} pages", lines.len(), pages.len());

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let top = layout.page_height() - layout.margin() - layout.font_size;
        let mut kids = Vec::with_capacity(pages.len());

        for page_lines in &pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), layout.font_size.into()]),
                Operation::new("TL", vec![layout.leading().into()]),
                Operation::new("Td", vec![layout.margin().into(), top.into()]),
            ];
            for line in page_lines.iter() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(line))]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), layout.page_width().into(), layout.page_height().into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Approximate Helvetica advance width, in ems
fn char_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' | 'I' => 0.28,
        ' ' | 'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.33,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        c if c.is_ascii_uppercase() => 0.67,
        _ => 0.55,
    }
}

fn text_width(s: &str, font_size: f32) -> f32 {
    s.chars().map(char_width).sum::<f32>() * font_size
}

/// Greedy word wrap. Newlines start a new line; words wider than a whole line
/// are split wherever they overflow.
pub fn wrap_text(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            for c in word.chars() {
                current.push(c);
                if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }

        lines.push(current);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

/// Map text onto WinAnsiEncoding; anything it cannot represent becomes '?'
fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80,
            '\u{2026}' => 0x85,
            '\u{2018}' => 0x91,
            '\u{2019}' => 0x92,
            '\u{201C}' => 0x93,
            '\u{201D}' => 0x94,
            '\u{2022}' => 0x95,
            '\u{2013}' => 0x96,
            '\u{2014}' => 0x97,
            '\t' => b' ',
            c if (c as u32) < 0x80 && !c.is_control() => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(pdf_filename(date), "youtube_summary_2024-03-07.pdf");
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(20);
        let lines = wrap_text(&text, 200.0, 11.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 11.0) <= 200.0, "line too wide: {line}");
            assert_eq!(line, line.trim());
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, text.trim());
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let word = "a".repeat(100);
        let lines = wrap_text(&word, 50.0, 11.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let lines = wrap_text("first\n\nsecond\n", 500.0, 11.0);
        assert_eq!(lines, vec!["first", "", "second"]);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("caf\u{e9}"), b"caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("it\u{2019}s"), b"it\x92s".to_vec());
        assert_eq!(encode_win_ansi("\u{65e5}"), b"?".to_vec());
    }

    #[test]
    fn test_render_single_page() {
        let exporter = PdfExporter::new(Path::new("."));
        let bytes = exporter.render("Key points:\n- one\n- two").unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_paginates() {
        let exporter = PdfExporter::new(Path::new("."));
        let lines_per_page = PdfLayout::default().lines_per_page();
        let text = (0..lines_per_page * 2 + 1)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let doc = Document::load_mem(&exporter.render(&text).unwrap()).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_export_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();

        let path = exporter.export("A summary.", date).unwrap();
        assert_eq!(path, dir.path().join("youtube_summary_2025-12-01.pdf"));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn test_export_refuses_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = PdfExporter::new(dir.path());
        let date = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        assert!(exporter.export("   ", date).is_err());
    }
}
