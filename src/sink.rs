//! Delta publication.
//!
//! Updates leave the engine as Signal K-style delta messages: batches of
//! `{path, value}` pairs plus per-path metadata, and notification
//! raise/clear values on `notifications.` paths. The bundled sink writes one
//! JSON message per line on stdout; log output goes to stderr so the data
//! channel stays clean.

use std::io::{self, Write};

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::engine::rules::Notification;

/// Metadata published once per maintained path at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathMetadata {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

/// A batch of path updates committed as one message.
#[derive(Debug, Default)]
pub struct Delta {
    values: Vec<(String, Value)>,
    meta: Vec<(String, PathMetadata)>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, path: impl Into<String>, value: Value) {
        self.values.push((path.into(), value));
    }

    pub fn add_meta(&mut self, path: impl Into<String>, meta: PathMetadata) {
        self.meta.push((path.into(), meta));
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.meta.is_empty()
    }
}

/// Outbound publication seam.
pub trait DeltaSink {
    /// Publish a batch of value/metadata updates.
    fn commit(&mut self, delta: &Delta) -> Result<()>;

    /// Raise (`Some`) or clear (`None`) a notification at `path`.
    fn notify(&mut self, path: &str, notification: Option<&Notification>) -> Result<()>;
}

/// Writes one JSON delta message per line to any writer.
pub struct JsonDeltaSink<W: Write> {
    writer: W,
}

impl JsonDeltaSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            writer: io::stdout(),
        }
    }
}

impl<W: Write> JsonDeltaSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn emit(&mut self, values: Vec<Value>, meta: Vec<Value>) -> Result<()> {
        let mut update = json!({
            "source": { "type": "plugin", "src": "sunphases" },
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "values": values,
        });
        if !meta.is_empty() {
            update["meta"] = Value::Array(meta);
        }
        writeln!(self.writer, "{}", json!({ "updates": [update] }))?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> DeltaSink for JsonDeltaSink<W> {
    fn commit(&mut self, delta: &Delta) -> Result<()> {
        if delta.is_empty() {
            return Ok(());
        }
        let values = delta
            .values
            .iter()
            .map(|(path, value)| json!({ "path": path, "value": value }))
            .collect();
        let meta = delta
            .meta
            .iter()
            .map(|(path, meta)| json!({ "path": path, "value": meta }))
            .collect();
        self.emit(values, meta)
    }

    fn notify(&mut self, path: &str, notification: Option<&Notification>) -> Result<()> {
        let value = match notification {
            Some(n) => serde_json::to_value(n)?,
            None => Value::Null,
        };
        self.emit(vec![json!({ "path": path, "value": value })], vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rules::Severity;

    #[test]
    fn commit_writes_one_wellformed_message_per_batch() {
        let mut buffer = Vec::new();
        {
            let mut sink = JsonDeltaSink::new(&mut buffer);
            let mut delta = Delta::new();
            delta.add_value(
                "environment.sunphases.sunrise",
                Value::String("2024-06-21T03:43:00.000Z".into()),
            );
            delta.add_meta(
                "environment.sunphases.sunrise",
                PathMetadata {
                    description: "Top edge of the sun appears on the horizon".into(),
                    units: Some("ISO8601 (UTC)".into()),
                },
            );
            sink.commit(&delta).unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 1);
        let message: Value = serde_json::from_str(text.trim()).unwrap();
        let update = &message["updates"][0];
        assert_eq!(update["source"]["src"], "sunphases");
        assert_eq!(
            update["values"][0]["path"],
            "environment.sunphases.sunrise"
        );
        assert_eq!(
            update["meta"][0]["value"]["units"],
            "ISO8601 (UTC)"
        );
    }

    #[test]
    fn empty_delta_writes_nothing() {
        let mut buffer = Vec::new();
        {
            let mut sink = JsonDeltaSink::new(&mut buffer);
            sink.commit(&Delta::new()).unwrap();
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn notify_null_clears_and_object_raises() {
        let mut buffer = Vec::new();
        {
            let mut sink = JsonDeltaSink::new(&mut buffer);
            sink.notify("notifications.environment.sunphases.daytime", None)
                .unwrap();
            sink.notify(
                "notifications.environment.sunphases.nighttime",
                Some(&Notification {
                    state: Severity::Normal,
                    method: vec![],
                    message: "Outside dawn and dusk.".into(),
                }),
            )
            .unwrap();
        }

        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();

        let clear: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert!(clear["updates"][0]["values"][0]["value"].is_null());

        let raise: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        let value = &raise["updates"][0]["values"][0]["value"];
        assert_eq!(value["state"], "normal");
        assert_eq!(value["message"], "Outside dawn and dusk.");
    }
}
