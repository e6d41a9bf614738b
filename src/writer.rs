//! Output document writers: plain text, RTF, and a minimal DOCX.
//!
//! The whole document is written as one paragraph. Line breaks inside it
//! are kept as soft breaks (`\line` in RTF, `<w:br/>` in DOCX).

use crate::error::FootnoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Write};
use std::path::Path;
use std::str::FromStr;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Target document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    /// Default: the result is a rich-text paragraph unless asked otherwise.
    #[default]
    Rtf,
    Docx,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Rtf => "rtf",
            OutputFormat::Docx => "docx",
        }
    }

    /// Format implied by the file extension, if recognised.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }

    /// Serialize `text` as a complete document in this format.
    pub fn render(self, text: &str) -> Result<Vec<u8>, FootnoteError> {
        match self {
            OutputFormat::Text => Ok(text.as_bytes().to_vec()),
            OutputFormat::Rtf => Ok(render_rtf(text).into_bytes()),
            OutputFormat::Docx => render_docx(text),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = FootnoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(OutputFormat::Text),
            "rtf" => Ok(OutputFormat::Rtf),
            "docx" => Ok(OutputFormat::Docx),
            other => Err(FootnoteError::InvalidConfig(format!(
                "Unknown output format '{}' (expected txt, rtf or docx)",
                other
            ))),
        }
    }
}

// ── RTF ──────────────────────────────────────────────────────────────────

/// Render `text` as a single-paragraph RTF document.
pub fn render_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    out.push_str("{\\rtf1\\ansi\\deff0{\\fonttbl{\\f0 Times New Roman;}}\n\\pard\\f0\\fs24 ");
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\line "),
            '\t' => out.push_str("\\tab "),
            '\r' => {}
            c if c.is_ascii() => out.push(c),
            c => {
                // \uN takes a signed 16-bit value; astral chars go as surrogate pairs.
                let mut buf = [0u16; 2];
                for unit in c.encode_utf16(&mut buf) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out.push_str("\\par\n}");
    out
}

// ── DOCX ─────────────────────────────────────────────────────────────────

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Render `text` as a DOCX package with one paragraph.
pub fn render_docx(text: &str) -> Result<Vec<u8>, FootnoteError> {
    let encode_err = |e: &dyn fmt::Display| FootnoteError::EncodeFailed {
        format: "docx",
        detail: e.to_string(),
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("word/document.xml", document_xml(text)),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).map_err(|e| encode_err(&e))?;
        zip.write_all(body.as_bytes()).map_err(|e| encode_err(&e))?;
    }

    let cursor = zip.finish().map_err(|e| encode_err(&e))?;
    Ok(cursor.into_inner())
}

fn document_xml(text: &str) -> String {
    let mut runs = String::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            runs.push_str("<w:br/>");
        }
        for (j, chunk) in line.split('\t').enumerate() {
            if j > 0 {
                runs.push_str("<w:tab/>");
            }
            if !chunk.is_empty() {
                runs.push_str("<w:t xml:space=\"preserve\">");
                runs.push_str(&xml_escape(chunk));
                runs.push_str("</w:t>");
            }
        }
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            "<w:body><w:p><w:r>{}</w:r></w:p></w:body></w:document>"
        ),
        runs
    )
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out/Report.DOCX")),
            Some(OutputFormat::Docx)
        );
        assert_eq!(OutputFormat::from_path(Path::new("a.rtf")), Some(OutputFormat::Rtf));
        assert_eq!(OutputFormat::from_path(Path::new("a.txt")), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_path(Path::new("a.pdf")), None);
        assert_eq!(OutputFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_unknown_format_is_config_error() {
        assert!(matches!(
            "odt".parse::<OutputFormat>(),
            Err(FootnoteError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rtf_escapes() {
        let rtf = render_rtf("a{b}\\c\nd\te é");
        assert!(rtf.starts_with("{\\rtf1"));
        assert!(rtf.contains("a\\{b\\}\\\\c\\line d\\tab e \\u233?"));
        assert!(rtf.ends_with("\\par\n}"));
    }

    #[test]
    fn test_docx_package_contents() {
        let bytes = render_docx("Claim [Footnote 1: A & B]\nnext").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("[Content_Types].xml").is_ok());
        assert!(archive.by_name("_rels/.rels").is_ok());

        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("Claim [Footnote 1: A &amp; B]"));
        assert!(xml.contains("<w:br/>"));
        assert_eq!(xml.matches("<w:p>").count(), 1);
    }

    #[test]
    fn test_text_is_verbatim() {
        let bytes = OutputFormat::Text.render("plain\ntext").unwrap();
        assert_eq!(bytes, b"plain\ntext");
    }
}
