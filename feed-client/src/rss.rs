//! RSS 2.0 to JSON Feed conversion.

use crate::authors::AuthorResolver;
use chrono::{DateTime, Utc};
use inkhaven_core::{FeedError, FeedItem, JsonFeed, JSON_FEED_VERSION};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

pub const DEFAULT_FEED_TITLE: &str = "Inkhaven Residency Publications";
pub const DEFAULT_HOME_PAGE_URL: &str = "https://inkhaven.com/";
pub const DEFAULT_DESCRIPTION: &str = "Latest publications from Inkhaven Residency writers";
pub const FEED_URL: &str = "https://inkhaven.com/feed.json";
pub const UNTITLED: &str = "Untitled";

#[derive(Debug, Default)]
struct RawChannel {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    items: Vec<RawItem>,
}

#[derive(Debug, Default)]
struct RawItem {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    pub_date: Option<String>,
}

impl RawItem {
    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "title" => Some(&mut self.title),
            "link" => Some(&mut self.link),
            "guid" => Some(&mut self.guid),
            "pubDate" => Some(&mut self.pub_date),
            _ => None,
        }
    }
}

impl RawChannel {
    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            "title" => Some(&mut self.title),
            "link" => Some(&mut self.link),
            "description" => Some(&mut self.description),
            _ => None,
        }
    }
}

/// Convert an RSS document into a JSON Feed, resolving each item's author
/// from its link.
pub fn convert_rss(xml: &str, resolver: &AuthorResolver) -> Result<JsonFeed, FeedError> {
    let channel = parse_channel(xml)?;
    info!("Converting {} items from XML to JSON...", channel.items.len());

    let items = channel
        .items
        .into_iter()
        .map(|raw| {
            let url = raw.link.unwrap_or_default();
            let id = raw.guid.unwrap_or_else(|| url.clone());
            let date_modified = raw
                .pub_date
                .map(|date| normalize_pub_date(&date))
                .unwrap_or_default();
            let author = resolver.resolve(&url);

            FeedItem {
                id,
                content_html: String::new(),
                url,
                title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
                date_modified,
                author,
            }
        })
        .collect();

    Ok(JsonFeed {
        version: JSON_FEED_VERSION.to_string(),
        title: channel
            .title
            .unwrap_or_else(|| DEFAULT_FEED_TITLE.to_string()),
        home_page_url: channel
            .link
            .unwrap_or_else(|| DEFAULT_HOME_PAGE_URL.to_string()),
        feed_url: FEED_URL.to_string(),
        description: channel
            .description
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        items,
    })
}

/// Render an RFC 2822 publish date as `YYYY-MM-DDTHH:MM:SS.000Z` in UTC.
/// Dates that do not parse are returned unchanged.
pub fn normalize_pub_date(pub_date: &str) -> String {
    match DateTime::parse_from_rfc2822(pub_date.trim()) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S.000Z")
            .to_string(),
        Err(e) => {
            debug!("Keeping unparseable pubDate {:?}: {}", pub_date, e);
            pub_date.to_string()
        }
    }
}

/// Walk the document keeping the path of open elements. Only unqualified
/// names are matched, so `atom:link` never shadows `link`.
fn parse_channel(xml: &str) -> Result<RawChannel, FeedError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut channel: Option<RawChannel> = None;
    let mut current_item: Option<RawItem> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let parent = path.last().map(String::as_str);

                if name == "channel" && channel.is_none() && path.len() <= 1 {
                    channel = Some(RawChannel::default());
                } else if name == "item" && parent == Some("channel") {
                    current_item = Some(RawItem::default());
                }
                path.push(name);
            }
            Ok(Event::End(_)) => {
                if let Some(name) = path.pop() {
                    if name == "item" {
                        if let (Some(item), Some(channel)) = (current_item.take(), channel.as_mut())
                        {
                            channel.items.push(item);
                        }
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(|e| FeedError::MalformedXml {
                    details: e.to_string(),
                })?;
                append_text(&path, &mut channel, &mut current_item, &text);
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e).into_owned();
                append_text(&path, &mut channel, &mut current_item, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FeedError::MalformedXml {
                    details: format!(
                        "error at position {}: {}",
                        reader.buffer_position(),
                        e
                    ),
                })
            }
            _ => {}
        }
        buf.clear();
    }

    let mut channel = channel.ok_or(FeedError::MissingChannel)?;
    trim_fields(&mut channel);
    Ok(channel)
}

fn append_text(
    path: &[String],
    channel: &mut Option<RawChannel>,
    current_item: &mut Option<RawItem>,
    text: &str,
) {
    let (Some(field), Some(parent)) = (path.last(), path.len().checked_sub(2).map(|i| &path[i]))
    else {
        return;
    };

    let slot = match parent.as_str() {
        "item" => current_item
            .as_mut()
            .and_then(|item| item.field_mut(field)),
        "channel" => channel
            .as_mut()
            .and_then(|channel| channel.field_mut(field)),
        _ => None,
    };

    if let Some(slot) = slot {
        slot.get_or_insert_with(String::new).push_str(text);
    }
}

/// Whitespace-only elements count as missing.
fn trim_fields(channel: &mut RawChannel) {
    fn trim(slot: &mut Option<String>) {
        *slot = slot
            .take()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    trim(&mut channel.title);
    trim(&mut channel.link);
    trim(&mut channel.description);
    for item in &mut channel.items {
        trim(&mut item.title);
        trim(&mut item.link);
        trim(&mut item.guid);
        trim(&mut item.pub_date);
    }
}
