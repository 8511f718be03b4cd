use std::fmt::Write as _;

use super::ExportError;
use crate::models::{Conference, Contribution};
use crate::utils::to_printable_ascii;

/// Renders printable documents of a contribution
pub trait DocumentGenerator: Send + Sync {
    fn contribution_to_pdf(
        &self,
        conference: &Conference,
        contribution: &Contribution,
    ) -> Result<Vec<u8>, ExportError>;
}

/// Plain-text PDF 1.4 writer using the built-in Helvetica font
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplePdf;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;
const LEADING: u32 = 14;
const LINES_PER_PAGE: usize = 54;
const WRAP_COLUMNS: usize = 90;

impl DocumentGenerator for SimplePdf {
    fn contribution_to_pdf(
        &self,
        conference: &Conference,
        contribution: &Contribution,
    ) -> Result<Vec<u8>, ExportError> {
        let lines = contribution_lines(conference, contribution);
        render_pages(&lines)
    }
}

/// Text lines of the contribution sheet, before wrapping
fn contribution_lines(conference: &Conference, contribution: &Contribution) -> Vec<String> {
    let mut lines = vec![
        contribution.title.clone(),
        String::new(),
        format!("Conference: {}", conference.title),
        format!("Contribution id: {}", contribution.id),
    ];

    if let Some(start) = contribution.start {
        let local = start.with_timezone(&conference.utc_offset());
        lines.push(format!(
            "Starts: {} ({})",
            local.format("%d %B %Y %H:%M"),
            conference.timezone
        ));
    }
    if contribution.duration_minutes > 0 {
        lines.push(format!(
            "Duration: {}h{:02}",
            contribution.duration_minutes / 60,
            contribution.duration_minutes % 60
        ));
    }
    if let Some(session) = contribution.session_id.as_deref().and_then(|id| conference.session(id)) {
        lines.push(format!("Session: {}", session.title));
    }
    if let Some(track) = contribution.track_id.as_deref().and_then(|id| conference.track(id)) {
        lines.push(format!("Track: {}", track.title));
    }
    if let Some(kind) = contribution
        .type_id
        .as_deref()
        .and_then(|id| conference.contribution_type(id))
    {
        lines.push(format!("Type: {}", kind.name));
    }

    let names = |people: Vec<String>| people.join(", ");
    let primary: Vec<String> = contribution.primary_authors().map(|p| p.full_name()).collect();
    if !primary.is_empty() {
        lines.push(format!("Primary authors: {}", names(primary)));
    }
    let co: Vec<String> = contribution.co_authors().map(|p| p.full_name()).collect();
    if !co.is_empty() {
        lines.push(format!("Co-authors: {}", names(co)));
    }
    let speakers: Vec<String> = contribution.speakers.iter().map(|p| p.full_name()).collect();
    if !speakers.is_empty() {
        lines.push(format!("Speakers: {}", names(speakers)));
    }

    if !contribution.description.trim().is_empty() {
        lines.push(String::new());
        lines.push("Description".to_string());
        lines.extend(contribution.description.lines().map(str::to_string));
    }

    for field in conference.abstract_fields.iter().filter(|f| f.active) {
        let value = contribution.field(&field.id);
        if value.trim().is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(field.name.clone());
        lines.extend(value.lines().map(str::to_string));
    }

    lines
}

/// Greedy word wrap of ASCII text; words longer than the width are split
fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let mut word = word.to_string();
        while word.len() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(width);
            out.push(word);
            word = rest;
        }
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out
}

/// Literal string operand: ASCII only, with delimiters escaped
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in to_printable_ascii(text, '?').chars() {
        if matches!(c, '\\' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(')');
    out
}

fn page_content(lines: &[String]) -> Result<String, ExportError> {
    let mut stream = String::new();
    let top = PAGE_HEIGHT - MARGIN;
    writeln!(stream, "BT\n/F1 11 Tf\n{} TL\n{} {} Td", LEADING, MARGIN, top).map_err(pdf_error)?;
    for line in lines {
        writeln!(stream, "{} Tj T*", pdf_string(line)).map_err(pdf_error)?;
    }
    stream.push_str("ET\n");
    Ok(stream)
}

fn pdf_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(e.to_string())
}

struct PdfBuilder {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuilder {
    fn new() -> Self {
        PdfBuilder {
            buffer: b"%PDF-1.4\n".to_vec(),
            offsets: Vec::new(),
        }
    }

    /// Appends object `n`; objects must be added in id order starting at 1
    fn object(&mut self, body: &str) {
        self.offsets.push(self.buffer.len());
        let id = self.offsets.len();
        self.buffer
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buffer.len();
        let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            trailer.push_str(&format!("{:010} 00000 n \n", offset));
        }
        trailer.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref_at
        ));
        self.buffer.extend_from_slice(trailer.as_bytes());
        self.buffer
    }
}

fn render_pages(lines: &[String]) -> Result<Vec<u8>, ExportError> {
    let wrapped: Vec<String> = lines
        .iter()
        .flat_map(|l| wrap(&to_printable_ascii(l, '?'), WRAP_COLUMNS))
        .collect();
    let pages: Vec<&[String]> = wrapped.chunks(LINES_PER_PAGE).collect();

    // 1 catalog, 2 page tree, 3 font, then a (page, content) pair per page
    let first_page = 4;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page + 2 * i))
        .collect();

    let mut pdf = PdfBuilder::new();
    pdf.object("<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    ));
    pdf.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");

    for (i, page) in pages.iter().enumerate() {
        let content_id = first_page + 2 * i + 1;
        pdf.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT, content_id
        ));
        let content = page_content(page)?;
        pdf.object(&format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    Ok(pdf.finish())
}
