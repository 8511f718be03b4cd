use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::ExportError;
use crate::models::{Conference, Contribution, Person};

/// Thin wrapper over the quick-xml writer for flat tag/value documents
struct XmlDocument {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlDocument {
    fn new() -> Result<Self, ExportError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        Ok(XmlDocument { writer })
    }

    fn open(&mut self, tag: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(tag)))
            .map_err(xml_error)
    }

    fn close(&mut self, tag: &str) -> Result<(), ExportError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(tag)))
            .map_err(xml_error)
    }

    fn tag(&mut self, tag: &str, value: &str) -> Result<(), ExportError> {
        if value.is_empty() {
            return self
                .writer
                .write_event(Event::Empty(BytesStart::new(tag)))
                .map_err(xml_error);
        }
        self.open(tag)?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_error)?;
        self.close(tag)
    }

    fn person(&mut self, tag: &str, person: &Person) -> Result<(), ExportError> {
        self.open(tag)?;
        self.tag("FirstName", &person.first_name)?;
        self.tag("FamilyName", &person.family_name)?;
        self.tag("Email", &person.email)?;
        self.tag("Affiliation", &person.affiliation)?;
        self.close(tag)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

fn xml_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Xml(e.to_string())
}

/// Tag name used for a custom abstract field
pub fn field_tag_name(field_name: &str) -> String {
    field_name.replace(' ', "_")
}

/// Project a contribution's metadata into an XML document
pub fn contribution_to_xml(
    conference: &Conference,
    contribution: &Contribution,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = XmlDocument::new()?;
    doc.open("contribution")?;
    doc.tag("Id", &contribution.id)?;
    doc.tag("Title", &contribution.title)?;
    doc.tag("Description", &contribution.description)?;

    for field in conference.abstract_fields.iter().filter(|f| f.active) {
        let value = contribution.field(&field.id);
        if !value.trim().is_empty() {
            doc.tag(&field_tag_name(&field.name), value)?;
        }
    }

    doc.tag("Conference", &conference.title)?;
    if let Some(session) = contribution
        .session_id
        .as_deref()
        .and_then(|id| conference.session(id))
    {
        doc.tag("Session", &session.title)?;
    }

    for author in contribution.primary_authors() {
        doc.person("PrimaryAuthor", author)?;
    }
    for author in contribution.co_authors() {
        doc.person("Co-Author", author)?;
    }
    for speaker in &contribution.speakers {
        doc.person("Speaker", speaker)?;
    }

    let type_name = contribution
        .type_id
        .as_deref()
        .and_then(|id| conference.contribution_type(id))
        .map(|t| t.name.as_str())
        .unwrap_or("");
    doc.tag("ContributionType", type_name)?;

    if let Some(track) = contribution
        .track_id
        .as_deref()
        .and_then(|id| conference.track(id))
    {
        doc.tag("Track", &track.title)?;
    }

    doc.close("contribution")?;
    Ok(doc.finish())
}
