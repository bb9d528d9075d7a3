//! JSON and CSV writers for command output.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use revdash_core::Review;
use serde::Serialize;

/// Opens `path` for writing, or stdout when no path is given.
pub(crate) fn open_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

pub(crate) fn write_json<W: Write, T: Serialize>(mut sink: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut sink, value)?;
    writeln!(sink)?;
    sink.flush()?;
    Ok(())
}

/// One flattened CSV line. The raw store record is left out.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    store: &'static str,
    native_id: &'a str,
    author: &'a str,
    rating: u8,
    title: Option<&'a str>,
    body: &'a str,
    timestamp: String,
    app_id: &'a str,
    app_version: Option<&'a str>,
}

impl<'a> From<&'a Review> for CsvRow<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            id: &review.id,
            store: review.store.as_str(),
            native_id: &review.native_id,
            author: &review.author,
            rating: review.rating,
            title: review.title.as_deref(),
            body: &review.body,
            timestamp: review.timestamp.to_rfc3339(),
            app_id: &review.app_id,
            app_version: review.app_version.as_deref(),
        }
    }
}

/// Writes one header line and one line per review.
pub(crate) fn write_csv<W: Write>(sink: W, reviews: &[Review]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(sink);
    if reviews.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record([
            "id",
            "store",
            "native_id",
            "author",
            "rating",
            "title",
            "body",
            "timestamp",
            "app_id",
            "app_version",
        ])?;
    }
    for review in reviews {
        writer.serialize(CsvRow::from(review))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use revdash_core::Store;

    fn review(store: Store, native_id: &str, title: Option<&str>, body: &str) -> Review {
        Review {
            id: Review::canonical_id(store, native_id),
            native_id: native_id.to_owned(),
            store,
            author: "Анна".to_owned(),
            rating: 4,
            title: title.map(ToOwned::to_owned),
            body: body.to_owned(),
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, 44, 8).unwrap(),
            app_id: "com.example.app".to_owned(),
            app_version: Some("2.3.1".to_owned()),
            raw: serde_json::json!({"ignored": true}),
        }
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let mut buf = Vec::new();
        write_csv(
            &mut buf,
            &[
                review(Store::Play, "gp-1", None, "fast, simple"),
                review(Store::AppStore, "42", Some("Nice"), "ok"),
            ],
        )
        .expect("csv written");
        let text = String::from_utf8(buf).expect("utf-8");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,store,native_id,author,rating,title,body,timestamp,app_id,app_version"
        );
        assert_eq!(
            lines[1],
            "play:gp-1,play,gp-1,Анна,4,,\"fast, simple\",2025-06-02T09:44:08+00:00,com.example.app,2.3.1"
        );
        assert!(lines[2].starts_with("app_store:42,app_store,42,Анна,4,Nice,ok,"));
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn empty_csv_still_has_header() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).expect("csv written");
        let text = String::from_utf8(buf).expect("utf-8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("id,store,"));
    }

    #[test]
    fn json_is_pretty_with_trailing_newline() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({"reviews": []})).expect("json written");
        let text = String::from_utf8(buf).expect("utf-8");
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"reviews\""));
    }
}
