//! Parsers for the App Store customer-reviews RSS feed.
//!
//! The same feed is served as JSON (`.../json`) and as Atom XML (`.../xml`).
//! Both carry one `entry` per review. Some storefronts prepend an entry that
//! describes the app itself; it has no `im:rating` and is skipped.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;

use crate::error::ScraperError;
use crate::types::AppStoreReview;

/// Reviews found on one feed page.
#[derive(Debug, Default)]
pub(super) struct FeedPage {
    pub(super) reviews: Vec<AppStoreReview>,
    /// Entries without a rating.
    pub(super) skipped: usize,
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FeedDocument {
    feed: Feed,
}

#[derive(Debug, Deserialize)]
struct Feed {
    /// An array, a single object when the page holds one entry, or absent.
    #[serde(default)]
    entry: Option<OneOrMany<FeedEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Debug, Deserialize)]
struct Label {
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: Option<Label>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    id: Option<Label>,
    author: Option<Author>,
    updated: Option<Label>,
    #[serde(rename = "im:rating")]
    rating: Option<Label>,
    #[serde(rename = "im:version")]
    version: Option<Label>,
    title: Option<Label>,
    content: Option<Label>,
    #[serde(rename = "im:voteCount")]
    vote_count: Option<Label>,
}

impl FeedEntry {
    fn into_review(self) -> Option<AppStoreReview> {
        let rating = self.rating?.label;
        Some(AppStoreReview {
            id: label_or_empty(self.id),
            author: self
                .author
                .and_then(|a| a.name)
                .map(|n| n.label)
                .unwrap_or_default(),
            rating,
            title: self.title.map(|t| t.label),
            content: label_or_empty(self.content),
            updated: label_or_empty(self.updated),
            version: self.version.map(|v| v.label),
            vote_count: self.vote_count.map(|v| v.label),
        })
    }
}

fn label_or_empty(label: Option<Label>) -> String {
    label.map(|l| l.label).unwrap_or_default()
}

/// Parses the JSON rendition of one feed page.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] if the body is not a feed document.
pub(super) fn parse_json_feed(body: &str) -> Result<FeedPage, ScraperError> {
    let document: FeedDocument =
        serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
            context: "app store review feed (json)".to_owned(),
            source: e,
        })?;

    let mut page = FeedPage::default();
    for entry in document.feed.entry.map(OneOrMany::into_vec).unwrap_or_default() {
        match entry.into_review() {
            Some(review) => page.reviews.push(review),
            None => page.skipped += 1,
        }
    }
    Ok(page)
}

// ---------------------------------------------------------------------------
// Atom XML
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct XmlEntry {
    id: String,
    author: String,
    updated: String,
    rating: Option<String>,
    version: Option<String>,
    title: Option<String>,
    content: String,
    vote_count: Option<String>,
}

impl XmlEntry {
    fn into_review(self) -> Option<AppStoreReview> {
        Some(AppStoreReview {
            rating: self.rating?,
            id: self.id,
            author: self.author,
            title: self.title,
            content: self.content,
            updated: self.updated,
            version: self.version,
            vote_count: self.vote_count,
        })
    }

    fn set(&mut self, path: &[String], text: String) {
        let Some(field) = path.last().map(String::as_str) else {
            return;
        };
        let parent = path
            .len()
            .checked_sub(2)
            .and_then(|i| path.get(i))
            .map(String::as_str);
        match (parent, field) {
            (Some("author"), "name") => self.author = text,
            (Some("entry"), "id") => self.id = text,
            (Some("entry"), "updated") => self.updated = text,
            (Some("entry"), "title") => self.title = Some(text),
            (Some("entry"), "content") => self.content = text,
            (Some("entry"), "im:rating") => self.rating = Some(text),
            (Some("entry"), "im:version") => self.version = Some(text),
            (Some("entry"), "im:voteCount") => self.vote_count = Some(text),
            _ => {}
        }
    }
}

/// Parses the Atom rendition of one feed page.
///
/// Only `<content type="text">` is read; the HTML rendition of the same
/// review body is ignored.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] for malformed XML and
/// [`ScraperError::MalformedPayload`] if the document is not an Atom feed.
pub(super) fn parse_xml_feed(body: &str) -> Result<FeedPage, ScraperError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut page = FeedPage::default();
    let mut saw_feed = false;
    // Element names from <entry> down to the current element.
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<XmlEntry> = None;
    let mut skip_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = element_name(&e);
                if name == "feed" {
                    saw_feed = true;
                } else if name == "entry" {
                    current = Some(XmlEntry::default());
                    path.clear();
                }
                if current.is_some() {
                    skip_text = name == "content" && !is_text_content(&e);
                    path.push(name);
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(entry) = current.as_mut().filter(|_| !skip_text) {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    entry.set(&path, text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(entry) = current.as_mut().filter(|_| !skip_text) {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    entry.set(&path, text);
                }
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                if current.is_some() {
                    path.pop();
                    skip_text = false;
                }
                if name == "entry" {
                    match current.take().and_then(XmlEntry::into_review) {
                        Some(review) => page.reviews.push(review),
                        None => page.skipped += 1,
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScraperError::Xml {
                    context: "app store review feed (xml)".to_owned(),
                    source: e,
                })
            }
            _ => {}
        }
    }

    if !saw_feed {
        return Err(ScraperError::MalformedPayload {
            context: "app store review feed (xml)".to_owned(),
            reason: "document has no <feed> element".to_owned(),
        });
    }
    Ok(page)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn is_text_content(e: &BytesStart<'_>) -> bool {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"type")
        .is_none_or(|attr| &*attr.value == b"text")
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_FEED: &str = r#"{
      "feed": {
        "author": {"name": {"label": "iTunes Store"}},
        "entry": [
          {
            "im:name": {"label": "Example App"},
            "title": {"label": "Example App - Example Inc."},
            "id": {"label": "https://apps.apple.com/ru/app/id123", "attributes": {"im:id": "123"}}
          },
          {
            "author": {"name": {"label": "maria_k"}, "uri": {"label": "https://itunes.apple.com/ru/reviews/id1"}},
            "updated": {"label": "2025-06-02T09:44:08-07:00"},
            "im:rating": {"label": "2"},
            "im:version": {"label": "5.12"},
            "id": {"label": "11223344"},
            "title": {"label": "Вылетает"},
            "content": {"label": "После обновления вылетает", "attributes": {"type": "text"}},
            "im:voteCount": {"label": "3"},
            "link": {"attributes": {"rel": "related", "href": "https://itunes.apple.com/ru/review?id=123"}}
          }
        ]
      }
    }"#;

    const XML_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns:im="http://itunes.apple.com/rss" xmlns="http://www.w3.org/2005/Atom" xml:lang="ru">
  <id>https://itunes.apple.com/ru/rss/customerreviews/page=1/id=123/sortby=mostrecent/xml</id>
  <title>iTunes Store: Customer Reviews</title>
  <updated>2025-06-03T01:00:00-07:00</updated>
  <entry>
    <updated>2025-06-02T09:44:08-07:00</updated>
    <id>11223344</id>
    <title>Отлично &amp; быстро</title>
    <content type="text">Всё работает</content>
    <content type="html">&lt;table&gt;&lt;tr&gt;&lt;td&gt;Всё работает&lt;/td&gt;&lt;/tr&gt;&lt;/table&gt;</content>
    <link rel="related" href="https://itunes.apple.com/ru/review?id=123&amp;type=Purple%20Software"/>
    <im:voteSum>0</im:voteSum>
    <im:contentType term="Application" label="Приложение"/>
    <im:voteCount>1</im:voteCount>
    <im:rating>5</im:rating>
    <im:version>5.12</im:version>
    <author><name>ivan</name><uri>https://itunes.apple.com/ru/reviews/id42</uri></author>
  </entry>
  <entry>
    <id>app-metadata</id>
    <title>Example App</title>
  </entry>
</feed>"#;

    #[test]
    fn json_feed_skips_metadata_entry() {
        let page = parse_json_feed(JSON_FEED).unwrap();
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.skipped, 1);

        let review = &page.reviews[0];
        assert_eq!(review.id, "11223344");
        assert_eq!(review.author, "maria_k");
        assert_eq!(review.rating, "2");
        assert_eq!(review.title.as_deref(), Some("Вылетает"));
        assert_eq!(review.content, "После обновления вылетает");
        assert_eq!(review.updated, "2025-06-02T09:44:08-07:00");
        assert_eq!(review.version.as_deref(), Some("5.12"));
        assert_eq!(review.vote_count.as_deref(), Some("3"));
    }

    #[test]
    fn json_feed_accepts_single_entry_object() {
        let body = r#"{"feed": {"entry": {
            "id": {"label": "9"}, "im:rating": {"label": "4"},
            "updated": {"label": "2025-06-01"}, "content": {"label": "ok"}
        }}}"#;
        let page = parse_json_feed(body).unwrap();
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.reviews[0].id, "9");
        assert_eq!(page.reviews[0].author, "");
    }

    #[test]
    fn json_feed_without_entries_is_empty() {
        let page = parse_json_feed(r#"{"feed": {"author": {"name": {"label": "iTunes Store"}}}}"#)
            .unwrap();
        assert!(page.reviews.is_empty());
    }

    #[test]
    fn json_body_that_is_not_a_feed_errors() {
        let err = parse_json_feed("<html></html>").unwrap_err();
        assert!(matches!(err, ScraperError::Deserialize { .. }));
    }

    #[test]
    fn xml_feed_reads_text_content_and_author() {
        let page = parse_xml_feed(XML_FEED).unwrap();
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.skipped, 1);

        let review = &page.reviews[0];
        assert_eq!(review.id, "11223344");
        assert_eq!(review.author, "ivan");
        assert_eq!(review.rating, "5");
        assert_eq!(review.title.as_deref(), Some("Отлично & быстро"));
        assert_eq!(review.content, "Всё работает");
        assert_eq!(review.updated, "2025-06-02T09:44:08-07:00");
        assert_eq!(review.version.as_deref(), Some("5.12"));
        assert_eq!(review.vote_count.as_deref(), Some("1"));
    }

    #[test]
    fn xml_without_feed_is_malformed() {
        let err = parse_xml_feed("<html><body>blocked</body></html>").unwrap_err();
        assert!(matches!(err, ScraperError::MalformedPayload { .. }));
    }

    #[test]
    fn broken_xml_is_an_error() {
        let err = parse_xml_feed("<feed><entry><id>1</entry></feed>").unwrap_err();
        assert!(matches!(err, ScraperError::Xml { .. }));
    }
}
