use std::io;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use sieve_core::Entry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Default for ChannelInfo {
    fn default() -> Self {
        Self {
            title: "Foreign Affairs (free-open only)".to_string(),
            link: "https://www.foreignaffairs.com/".to_string(),
            description: "Filtered RSS: only items that are free-open (no email gate, \
                          no subscription), confirmed across runs."
                .to_string(),
        }
    }
}

/// Renders confirmed entries as an RSS 2.0 document.
///
/// Entries without a publication time are stamped with `built_at`.
pub fn build_rss(
    channel: &ChannelInfo,
    items: &[Entry],
    built_at: DateTime<Utc>,
) -> io::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    writer.write_event(Event::Start(rss))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;
    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "lastBuildDate", &built_at.to_rfc2822())?;

    for item in items {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_text_element(&mut writer, "title", &item.title)?;
        write_text_element(&mut writer, "link", &item.url)?;

        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "true"));
        writer.write_event(Event::Start(guid))?;
        writer.write_event(Event::Text(BytesText::new(&item.url)))?;
        writer.write_event(Event::End(BytesEnd::new("guid")))?;

        let published = item.published_at.unwrap_or(built_at);
        write_text_element(&mut writer, "pubDate", &published.to_rfc2822())?;
        write_text_element(&mut writer, "description", &item.summary)?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut xml = String::from_utf8(writer.into_inner())
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    xml.push('\n');
    Ok(xml)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
