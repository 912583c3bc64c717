use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use signdb_core::types::{Lesson, Topic, Unit};
use signdb_core::{Error, Result};

use crate::query::TableQuery;

const TOPIC_COLUMNS: &[&str] =
    &["topic_id", "name", "code", "description", "level", "cover_image_url", "cover_video_url", "order_index", "is_active"];
const LESSON_COLUMNS: &[&str] = &["lesson_id", "topic_id", "title", "description", "order_index", "slug"];
const UNIT_COLUMNS: &[&str] =
    &["unit_id", "lesson_id", "type", "text", "transcription", "description", "code", "order_index", "image_url", "video_url"];

/// A read-only supplier of flat records.
pub trait RecordSource: Send + Sync {
    fn fetch(&self, query: &TableQuery) -> anyhow::Result<Vec<Value>>;
}

/// Snapshots of the catalogue. Every call goes to the source; nothing is cached.
pub struct ContentStore<S> {
    source: S,
}

impl<S: RecordSource> ContentStore<S> {
    pub fn new(source: S) -> Self { Self { source } }

    pub fn source(&self) -> &S { &self.source }

    /// Active topics, each with the number of lessons filed under it.
    pub fn all_topics(&self) -> Result<Vec<Topic>> {
        let query = TableQuery::new("topic")
            .select(TOPIC_COLUMNS)
            .eq("is_active", true)
            .order_by("order_index")
            .order_by("topic_id");
        let mut topics: Vec<Topic> = self.fetch_as(&query)?;

        let lessons = self.source.fetch(&TableQuery::new("lesson").select(&["topic_id"])).map_err(Error::store)?;
        let mut counts: HashMap<i64, usize> = HashMap::new();
        for topic_id in lessons.iter().filter_map(|l| l.get("topic_id").and_then(Value::as_i64)) {
            *counts.entry(topic_id).or_default() += 1;
        }
        for topic in &mut topics {
            topic.lesson_count = counts.get(&topic.id).copied().unwrap_or(0);
        }
        tracing::debug!(topics = topics.len(), lessons = lessons.len(), "loaded topics");
        Ok(topics)
    }

    /// Active topics whose name contains `query`, ignoring case.
    pub fn search_topics(&self, query: &str) -> Result<Vec<Topic>> {
        let needle = query.trim().to_lowercase();
        let topics = self.all_topics()?;
        Ok(topics.into_iter().filter(|t| t.name.to_lowercase().contains(&needle)).collect())
    }

    pub fn lessons_by_topic(&self, topic_id: i64) -> Result<Vec<Lesson>> {
        let query = TableQuery::new("lesson")
            .select(LESSON_COLUMNS)
            .eq("topic_id", topic_id)
            .order_by("order_index")
            .order_by("lesson_id");
        self.fetch_as(&query)
    }

    pub fn all_lessons(&self) -> Result<Vec<Lesson>> {
        let query = TableQuery::new("lesson")
            .select(LESSON_COLUMNS)
            .order_by("topic_id")
            .order_by("order_index")
            .order_by("lesson_id");
        self.fetch_as(&query)
    }

    /// Every unit, the input of a search index build.
    pub fn all_units(&self) -> Result<Vec<Unit>> {
        let query = TableQuery::new("unit").select(UNIT_COLUMNS).order_by("lesson_id").order_by("order_index");
        let units: Vec<Unit> = self.fetch_as(&query)?;
        tracing::info!(units = units.len(), "loaded unit snapshot");
        Ok(units)
    }

    fn fetch_as<T: DeserializeOwned>(&self, query: &TableQuery) -> Result<Vec<T>> {
        let rows = self.source.fetch(query).map_err(Error::store)?;
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row)
                    .map_err(|e| Error::Store(format!("malformed {} record: {e}", query.table)))
            })
            .collect()
    }
}
