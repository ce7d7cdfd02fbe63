use std::io::{Cursor, Write};
use std::string::FromUtf8Error;

use chrono::{DateTime, SecondsFormat, TimeZone};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::feed::model::{Feed, Item};
use crate::util::xml_safe;

pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Errors that can occur while serializing a feed.
#[derive(Debug, Error)]
pub enum AtomError {
    #[error("Failed to write Atom XML: {0}")]
    Xml(#[from] std::io::Error),

    #[error("Generated Atom contains invalid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// Serializes `feed` as an Atom 1.0 document.
///
/// Creates a document shaped like:
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8"?>
/// <feed xmlns="http://www.w3.org/2005/Atom">
///   <title>..</title>
///   <id>source uri</id>
///   <updated>created</updated>
///   <subtitle>description</subtitle>
///   <link href="source uri"/>
///   <author><name>..</name><email>..</email></author>
///   <entry>
///     <title>..</title>
///     <updated>..</updated>
///     <id>case id</id>
///     <link href="source uri#case id" rel="alternate"/>
///     <summary type="html">..</summary>
///   </entry>
/// </feed>
/// ```
///
/// Timestamps are RFC 3339 with the offset they were captured in. All text is
/// XML-escaped, so the `<br>` markers in summaries arrive as escaped HTML.
/// Characters XML 1.0 cannot carry (most C0 controls, U+FFFE, U+FFFF) are
/// written as U+FFFD.
pub fn to_atom(feed: &Feed) -> Result<String, AtomError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM_NAMESPACE));
    writer.write_event(Event::Start(root))?;

    write_text_element(&mut writer, "title", &feed.title)?;
    write_text_element(&mut writer, "id", &feed.link)?;
    write_text_element(&mut writer, "updated", &timestamp(&feed.created))?;
    if !feed.description.is_empty() {
        write_text_element(&mut writer, "subtitle", &feed.description)?;
    }

    let mut link = BytesStart::new("link");
    link.push_attribute(("href", &*xml_safe(&feed.link)));
    writer.write_event(Event::Empty(link))?;

    writer.write_event(Event::Start(BytesStart::new("author")))?;
    write_text_element(&mut writer, "name", &feed.author.name)?;
    if !feed.author.email.is_empty() {
        write_text_element(&mut writer, "email", &feed.author.email)?;
    }
    writer.write_event(Event::End(BytesEnd::new("author")))?;

    for item in &feed.items {
        write_entry(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("feed")))?;

    let bytes = writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}

fn write_entry<W: Write>(writer: &mut Writer<W>, item: &Item) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("entry")))?;

    write_text_element(writer, "title", &item.title)?;
    write_text_element(writer, "updated", &timestamp(&item.created))?;
    write_text_element(writer, "id", &item.id)?;

    let mut link = BytesStart::new("link");
    link.push_attribute(("href", &*xml_safe(&item.link)));
    link.push_attribute(("rel", "alternate"));
    writer.write_event(Event::Empty(link))?;

    let mut summary = BytesStart::new("summary");
    summary.push_attribute(("type", "html"));
    writer.write_event(Event::Start(summary))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(&item.description))))?;
    writer.write_event(Event::End(BytesEnd::new("summary")))?;

    writer.write_event(Event::End(BytesEnd::new("entry")))
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> std::io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
