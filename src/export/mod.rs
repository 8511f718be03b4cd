//! Read-only document projections of a contribution.

pub mod pdf;
pub mod xml;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::utils::sanitize_header_filename;

pub use pdf::{DocumentGenerator, SimplePdf};
pub use xml::contribution_to_xml;

pub const XML_CONTENT_TYPE: &str = "application/xml";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("XML generation failed: {0}")]
    Xml(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// A rendered document with the metadata needed to serve it inline
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub content_type: &'static str,
    /// Already sanitized for use in a header
    pub filename: String,
    pub body: Vec<u8>,
}

impl ExportPayload {
    pub fn new(content_type: &'static str, filename: &str, body: Vec<u8>) -> Self {
        ExportPayload {
            content_type,
            filename: sanitize_header_filename(filename),
            body,
        }
    }

    pub fn content_disposition(&self) -> String {
        format!("inline; filename=\"{}\"", self.filename)
    }
}

impl IntoResponse for ExportPayload {
    fn into_response(self) -> Response {
        let disposition = self.content_disposition();
        (
            [
                (header::CONTENT_TYPE, self.content_type.to_string()),
                (header::CONTENT_LENGTH, self.body.len().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

/// XML export of a contribution, named `<title> - contribution.xml`
pub fn contribution_xml(
    conference: &crate::models::Conference,
    contribution: &crate::models::Contribution,
) -> Result<ExportPayload, ExportError> {
    let body = contribution_to_xml(conference, contribution)?;
    Ok(ExportPayload::new(
        XML_CONTENT_TYPE,
        &format!("{} - contribution.xml", contribution.title),
        body,
    ))
}

/// PDF export of a contribution, named `<title> - Contribution.pdf`
pub fn contribution_pdf(
    generator: &dyn DocumentGenerator,
    conference: &crate::models::Conference,
    contribution: &crate::models::Contribution,
) -> Result<ExportPayload, ExportError> {
    let body = generator.contribution_to_pdf(conference, contribution)?;
    Ok(ExportPayload::new(
        PDF_CONTENT_TYPE,
        &format!("{} - Contribution.pdf", contribution.title),
        body,
    ))
}
