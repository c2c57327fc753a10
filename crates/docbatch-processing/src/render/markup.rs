//! Source document to intermediate HTML, for the headless-render strategy.

use std::io::{Cursor, Read};

use docbatch_core::{AppError, SourceDocument};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

const PAGE_STYLE: &str = "body{font-family:'Liberation Serif','Times New Roman',serif;\
font-size:11pt;line-height:1.35;margin:0}\
p,h1,h2,h3,h4,h5,h6{white-space:pre-wrap;margin:0 0 0.6em 0}\
table{border-collapse:collapse;margin:0 0 0.8em 0}\
td{border:1px solid #999;padding:2pt 4pt;vertical-align:top}\
pre{white-space:pre-wrap;font-family:'Liberation Mono',monospace;font-size:10pt}";

/// Turns raw document bytes into an HTML page.
pub trait MarkupConverter: Send + Sync {
    fn to_html(&self, doc: &SourceDocument) -> Result<String, AppError>;
}

/// Handles WordprocessingML (`.docx`), plain text and HTML sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfficeMarkupConverter;

impl MarkupConverter for OfficeMarkupConverter {
    fn to_html(&self, doc: &SourceDocument) -> Result<String, AppError> {
        let failed = |reason: String| AppError::ConversionFailed {
            file: doc.filename.clone(),
            reason,
        };

        match doc.extension().as_deref() {
            Some("docx") => {
                let body = docx_to_html(&doc.data).map_err(|e| failed(format!("{:#}", e)))?;
                Ok(wrap_page(doc.stem(), &body))
            }
            Some("txt") => {
                let text = String::from_utf8_lossy(&doc.data);
                Ok(wrap_page(
                    doc.stem(),
                    &format!("<pre>{}</pre>", escape_html(&text)),
                ))
            }
            Some("html") | Some("htm") => Ok(String::from_utf8_lossy(&doc.data).into_owned()),
            other => Err(failed(format!(
                "'{}' sources need the native converter",
                other.unwrap_or("extensionless")
            ))),
        }
    }
}

fn wrap_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title>\
<style>{}</style></head><body>{}</body></html>",
        escape_html(title),
        PAGE_STYLE,
        body
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
}

#[derive(Default)]
struct Paragraph {
    heading: Option<u8>,
    content: String,
}

/// Walks `word/document.xml` and emits HTML for the body.
///
/// Supported: paragraphs, `Heading1`..`Heading6` styles, bold/italic/underline runs, line breaks,
/// tabs and tables. Everything else contributes its text only.
pub fn docx_to_html(data: &[u8]) -> anyhow::Result<String> {
    use anyhow::Context;

    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).context("not a valid DOCX container")?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .with_context(|| format!("missing {}", DOCUMENT_PART))?
        .read_to_string(&mut xml)
        .with_context(|| format!("unreadable {}", DOCUMENT_PART))?;

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();

    let mut html = String::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut run = RunStyle::default();
    let mut in_run = false;
    let mut in_run_props = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:p" => paragraph = Some(Paragraph::default()),
                b"w:r" => {
                    run = RunStyle::default();
                    in_run = true;
                }
                b"w:rPr" => in_run_props = true,
                b"w:t" => in_text = true,
                b"w:tbl" => html.push_str("<table>"),
                b"w:tr" => html.push_str("<tr>"),
                b"w:tc" => html.push_str("<td>"),
                _ => apply_property(e, in_run_props, &mut run, paragraph.as_mut()),
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:br" | b"w:cr" => {
                    if let Some(p) = paragraph.as_mut() {
                        p.content.push_str("<br/>");
                    }
                }
                // `w:tab` is also a tab-stop definition inside `w:pPr/w:tabs`.
                b"w:tab" if in_run && !in_run_props => {
                    if let Some(p) = paragraph.as_mut() {
                        p.content.push('\t');
                    }
                }
                b"w:p" => html.push_str("<p></p>"),
                _ => apply_property(e, in_run_props, &mut run, paragraph.as_mut()),
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:p" => {
                    if let Some(p) = paragraph.take() {
                        let tag = match p.heading {
                            Some(level) => format!("h{}", level),
                            None => "p".to_string(),
                        };
                        html.push_str(&format!("<{tag}>{}</{tag}>", p.content));
                    }
                }
                b"w:r" => in_run = false,
                b"w:rPr" => in_run_props = false,
                b"w:t" => in_text = false,
                b"w:tbl" => html.push_str("</table>"),
                b"w:tr" => html.push_str("</tr>"),
                b"w:tc" => html.push_str("</td>"),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text => {
                let text = t.unescape().context("bad text in document.xml")?;
                if let Some(p) = paragraph.as_mut() {
                    p.content.push_str(&styled(&escape_html(&text), &run));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(html)
}

fn styled(text: &str, run: &RunStyle) -> String {
    let mut out = text.to_string();
    if run.underline {
        out = format!("<u>{}</u>", out);
    }
    if run.italic {
        out = format!("<em>{}</em>", out);
    }
    if run.bold {
        out = format!("<strong>{}</strong>", out);
    }
    out
}

/// Handles the run/paragraph property elements we care about.
fn apply_property(
    e: &BytesStart,
    in_run_props: bool,
    run: &mut RunStyle,
    paragraph: Option<&mut Paragraph>,
) {
    match e.name().as_ref() {
        b"w:b" if in_run_props => run.bold = toggle_on(e),
        b"w:i" if in_run_props => run.italic = toggle_on(e),
        b"w:u" if in_run_props => {
            run.underline = attr(e, b"w:val").map(|v| v != "none").unwrap_or(true)
        }
        b"w:pStyle" => {
            if let (Some(p), Some(style)) = (paragraph, attr(e, b"w:val")) {
                p.heading = heading_level(&style);
            }
        }
        _ => {}
    }
}

/// `<w:b/>` is on; `<w:b w:val="0"/>` / `"false"` is off.
fn toggle_on(e: &BytesStart) -> bool {
    !matches!(attr(e, b"w:val").as_deref(), Some("0") | Some("false") | Some("off"))
}

fn attr(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn heading_level(style: &str) -> Option<u8> {
    let level = style
        .strip_prefix("Heading")
        .or_else(|| style.strip_prefix("heading"))?
        .trim()
        .parse::<u8>()
        .ok()?;
    (1..=6).contains(&level).then_some(level)
}
