use std::path::Path;

use figment::Jail;

use signdb_core::config::{resolve_with_base, Config, EmbeddingProviderKind};
use signdb_core::types::{Topic, Unit, UnitKind};
use signdb_core::variants::VariantSplitter;

fn unit(id: i64, description: Option<&str>) -> Unit {
    Unit { id, text: format!("unit {id}"), description: description.map(String::from), ..Unit::default() }
}

#[test]
fn entries_skip_units_without_description() {
    let units = vec![
        unit(7, Some("Mô tả 1: wave hand side to side\n\nMô tả 2: palm facing outward")),
        unit(9, Some("move fist in circle")),
        unit(12, None),
        unit(13, Some("   ")),
    ];
    let entries = VariantSplitter::default().entries_from_units(&units);

    assert_eq!(entries.len(), 3, "two variants for unit 7, one for unit 9");
    assert_eq!(entries[0].id, "7:0");
    assert_eq!(entries[1].id, "7:1");
    assert_eq!(entries[1].total_variants, 2);
    assert_eq!(entries[2].unit_id, 9);
    assert!(entries.iter().all(|e| e.unit_id != 12 && e.unit_id != 13));
}

#[test]
fn unit_deserializes_remote_primary_key() {
    let raw = serde_json::json!({
        "unit_id": 3,
        "lesson_id": 1,
        "type": "letter",
        "text": "A",
        "description": null,
        "video_url": "https://cdn/a.mp4"
    });
    let unit: Unit = serde_json::from_value(raw).expect("unit");
    assert_eq!(unit.id, 3);
    assert_eq!(unit.kind, Some(UnitKind::Letter));
    assert_eq!(unit.video_url.as_deref(), Some("https://cdn/a.mp4"));

    let encoded = serde_json::to_value(&unit).expect("encode");
    assert_eq!(encoded["id"], 3, "serialized under the uniform id field");
}

#[test]
fn topic_defaults_to_active() {
    let topic: Topic = serde_json::from_value(serde_json::json!({"topic_id": 1, "name": "Alphabet"})).expect("topic");
    assert!(topic.is_active);
    assert_eq!(topic.lesson_count, 0);
}

#[test]
fn config_defaults_and_env_overrides() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", r#"
            [search]
            semantic_weight = 0.4
            oversample = 4

            [embedding]
            provider = "fake"
        "#)?;
        jail.set_env("APP_SEARCH__LEXICAL_WEIGHT", "0.6");
        jail.set_env("GEMINI_API_KEY", "legacy-key");

        let config = Config::load_for_env("test").expect("config");
        let settings = config.settings().expect("settings");
        assert!((settings.search.semantic_weight - 0.4).abs() < 1e-6);
        assert!((settings.search.lexical_weight - 0.6).abs() < 1e-6);
        assert_eq!(settings.search.oversample, 4);
        assert_eq!(settings.search.default_top_k, 3);
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Fake);
        assert_eq!(settings.embedding.api_key.as_deref(), Some("legacy-key"));
        assert!((settings.gesture.smoothing_alpha - 0.5).abs() < 1e-6);

        let weight: f32 = config.get("search.semantic_weight").expect("get");
        assert!((weight - 0.4).abs() < 1e-6);
        Ok(())
    });
}

#[test]
fn config_rejects_invalid_values() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[search]\nsemantic_weight = -1.0\n")?;
        assert!(Config::load_for_env("test").is_err(), "negative weight");

        jail.create_file("config.toml", "[search]\noversample = 1\n")?;
        assert!(Config::load_for_env("test").is_err(), "oversample below 3");

        jail.create_file("config.toml", "[gesture]\nsmoothing_alpha = 0.0\n")?;
        assert!(Config::load_for_env("test").is_err(), "alpha outside (0, 1]");

        jail.create_file("config.toml", "[embedding]\nprovider = \"fake\"\ndim = 0\n")?;
        assert!(Config::load_for_env("test").is_err(), "zero embedding dimension");

        jail.create_file("config.toml", "[embedding]\nprovider = \"fake\"\n")?;
        assert!(Config::load_for_env("prod").is_err(), "fake embeddings in production");
        Ok(())
    });
}

#[test]
fn model_paths_resolve_against_base() {
    let base = tempfile::tempdir().expect("tempdir");
    let resolved = resolve_with_base(base.path(), "models/bge-m3");
    assert_eq!(resolved, base.path().join("models/bge-m3"));

    let absolute = base.path().join("weights");
    assert_eq!(resolve_with_base(Path::new("/elsewhere"), absolute.to_string_lossy()), absolute);
}
