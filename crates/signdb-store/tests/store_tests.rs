use serde_json::json;

use signdb_core::config::StoreSettings;
use signdb_core::types::UnitKind;
use signdb_core::Error;
use signdb_store::{ContentStore, MemorySource, RestSource};

fn catalogue() -> MemorySource {
    MemorySource::new()
        .with_table(
            "topic",
            vec![
                json!({"topic_id": 2, "name": "Gia đình", "order_index": 2, "is_active": true}),
                json!({"topic_id": 1, "name": "Chào hỏi", "order_index": 1, "is_active": true}),
                json!({"topic_id": 3, "name": "Gia vị", "order_index": 3, "is_active": false}),
                json!({"topic_id": 4, "name": "Số đếm", "order_index": 2, "is_active": true}),
            ],
        )
        .with_table(
            "lesson",
            vec![
                json!({"lesson_id": 10, "topic_id": 1, "title": "Xin chào", "order_index": 2}),
                json!({"lesson_id": 11, "topic_id": 1, "title": "Tạm biệt", "order_index": 1}),
                json!({"lesson_id": 20, "topic_id": 2, "title": "Bố mẹ", "order_index": 1, "slug": "bo-me"}),
            ],
        )
        .with_table(
            "unit",
            vec![
                json!({"unit_id": 9, "lesson_id": 20, "type": "word", "text": "Mẹ", "order_index": 2, "description": "move fist in circle"}),
                json!({"unit_id": 7, "lesson_id": 10, "type": "phrase", "text": "Xin chào", "order_index": 1,
                       "description": "Mô tả 1: wave hand side to side\n\nMô tả 2: palm facing outward",
                       "video_url": "https://cdn.example/7.mp4", "transcription": "sin chao"}),
                json!({"unit_id": 12, "lesson_id": 20, "type": "word", "text": "Bố", "order_index": 1, "description": null}),
            ],
        )
}

#[test]
fn active_topics_in_order_with_lesson_counts() {
    let store = ContentStore::new(catalogue());
    let topics = store.all_topics().expect("topics");
    let ids: Vec<i64> = topics.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 4]);
    let counts: Vec<usize> = topics.iter().map(|t| t.lesson_count).collect();
    assert_eq!(counts, vec![2, 1, 0]);
}

#[test]
fn topic_search_ignores_case_and_inactive_topics() {
    let store = ContentStore::new(catalogue());
    let found = store.search_topics("GIA").expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Gia đình");
    assert!(store.search_topics("không có").expect("search").is_empty());
}

#[test]
fn lessons_are_scoped_and_ordered() {
    let store = ContentStore::new(catalogue());
    let lessons = store.lessons_by_topic(1).expect("lessons");
    let ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![11, 10]);

    let all: Vec<(i64, i64)> = store.all_lessons().expect("all").iter().map(|l| (l.topic_id, l.id)).collect();
    assert_eq!(all, vec![(1, 11), (1, 10), (2, 20)]);
    assert_eq!(store.all_lessons().expect("all")[2].slug.as_deref(), Some("bo-me"));
}

#[test]
fn units_are_normalized() {
    let store = ContentStore::new(catalogue());
    let units = store.all_units().expect("units");
    let ids: Vec<i64> = units.iter().map(|u| u.id).collect();
    assert_eq!(ids, vec![7, 12, 9]);
    assert_eq!(units[0].kind, Some(UnitKind::Phrase));
    assert_eq!(units[0].video_url.as_deref(), Some("https://cdn.example/7.mp4"));
    assert_eq!(units[0].transcription.as_deref(), Some("sin chao"));
    assert!(units[1].description.is_none());
}

#[test]
fn malformed_records_are_store_errors() {
    let source = catalogue().with_table("unit", vec![json!({"unit_id": "seven"})]);
    let err = ContentStore::new(source).all_units().unwrap_err();
    assert!(matches!(err, Error::Store(msg) if msg.contains("unit")));
}

#[test]
fn source_failures_are_store_errors() {
    let store = ContentStore::new(MemorySource::new());
    assert!(matches!(store.all_units(), Err(Error::Store(_))));
}

#[test]
fn rest_source_requires_credentials() {
    let missing_key = StoreSettings { url: Some("https://db.example".into()), api_key: None, ..StoreSettings::default() };
    assert!(matches!(RestSource::new(&missing_key), Err(Error::InvalidConfig(_))));
    let blank_url = StoreSettings { url: Some("  ".into()), api_key: Some("anon".into()), ..StoreSettings::default() };
    assert!(matches!(RestSource::new(&blank_url), Err(Error::InvalidConfig(_))));

    let ok = StoreSettings { url: Some("https://db.example/".into()), api_key: Some("anon".into()), ..StoreSettings::default() };
    assert_eq!(RestSource::new(&ok).expect("source").base_url(), "https://db.example");
}
