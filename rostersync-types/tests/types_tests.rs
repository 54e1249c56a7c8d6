use pretty_assertions::assert_eq;
use rostersync_types::{DetailRecord, Entity, Error, Position, RecordKey, ScoreCategory};

fn sample_record() -> DetailRecord {
    DetailRecord {
        id: "100001".into(),
        username: "Legor".into(),
        server_id: Some("en166".into()),
        timestamp: 1_700_000_000,
        positions: vec![
            Position {
                category: ScoreCategory::Total,
                score: 123_456,
                ranking: 12,
                ships: None,
            },
            Position {
                category: ScoreCategory::Military,
                score: 9_000,
                ranking: 40,
                ships: Some(1_250),
            },
        ],
        planet_count: 9,
        alliance_id: Some("500001".into()),
    }
}

// ── RecordKey ───────────────────────────────────────────────────

#[test]
fn entity_key_uses_id_and_name() {
    let entity = Entity::new("100001", "Legor");
    assert_eq!(entity.key(), RecordKey::new("100001", "Legor"));
}

#[test]
fn record_key_display_and_parse() {
    let key = RecordKey::new("42", "Nova");
    assert_eq!(key.to_string(), "42/Nova");
    assert_eq!(RecordKey::parse("42/Nova").unwrap(), key);
}

#[test]
fn record_key_parse_keeps_slashes_in_username() {
    let key = RecordKey::parse("42/a/b").unwrap();
    assert_eq!(key.id, "42");
    assert_eq!(key.username, "a/b");
}

#[test]
fn record_key_parse_rejects_missing_separator() {
    assert!(matches!(RecordKey::parse("42"), Err(Error::InvalidKey(_))));
    assert!(matches!(RecordKey::parse("/Nova"), Err(Error::InvalidKey(_))));
}

#[test]
fn record_key_serializes_with_store_attribute_names() {
    let json = serde_json::to_value(RecordKey::new("1", "a")).unwrap();
    assert_eq!(json, serde_json::json!({"ID": "1", "Username": "a"}));
}

#[test]
fn record_keys_order_by_id_first() {
    let mut keys = vec![
        RecordKey::new("2", "a"),
        RecordKey::new("1", "z"),
        RecordKey::new("1", "b"),
    ];
    keys.sort();
    assert_eq!(
        keys,
        vec![
            RecordKey::new("1", "b"),
            RecordKey::new("1", "z"),
            RecordKey::new("2", "a"),
        ]
    );
}

// ── ScoreCategory ───────────────────────────────────────────────

#[test]
fn score_category_codes_round_trip() {
    for category in ScoreCategory::ALL {
        assert_eq!(ScoreCategory::try_from(category.code()).unwrap(), category);
    }
}

#[test]
fn score_category_rejects_unknown_code() {
    assert!(matches!(
        ScoreCategory::try_from(8),
        Err(Error::UnknownCategory(8))
    ));
}

#[test]
fn score_category_serializes_as_number() {
    assert_eq!(
        serde_json::to_value(ScoreCategory::MilitaryLost).unwrap(),
        serde_json::json!(6)
    );
    let parsed: ScoreCategory = serde_json::from_value(serde_json::json!(3)).unwrap();
    assert_eq!(parsed, ScoreCategory::Military);
    assert!(serde_json::from_value::<ScoreCategory>(serde_json::json!(99)).is_err());
}

// ── DetailRecord ────────────────────────────────────────────────

#[test]
fn with_identity_overwrites_payload_identity() {
    let entity = Entity::new("100001", "Legor");
    let record = DetailRecord {
        id: "wrong".into(),
        username: "someone else".into(),
        ..sample_record()
    }
    .with_identity(&entity);

    assert_eq!(record.key(), entity.key());
    assert_eq!(record.planet_count, 9);
}

#[test]
fn detail_record_uses_store_attribute_names() {
    let json = serde_json::to_value(sample_record()).unwrap();
    assert_eq!(json["ID"], "100001");
    assert_eq!(json["Username"], "Legor");
    assert_eq!(json["ServerId"], "en166");
    assert_eq!(json["Positions"][1]["Type"], 3);
    assert_eq!(json["Positions"][1]["Ships"], 1_250);
    assert!(json["Positions"][0].get("Ships").is_none());
}

#[test]
fn detail_record_decodes_with_missing_optional_fields() {
    let record: DetailRecord =
        serde_json::from_value(serde_json::json!({"ID": "7", "Username": "x"})).unwrap();
    assert_eq!(record.key(), RecordKey::new("7", "x"));
    assert!(record.positions.is_empty());
    assert_eq!(record.alliance_id, None);
}

#[test]
fn detail_record_position_lookup() {
    let record = sample_record();
    assert_eq!(record.position(ScoreCategory::Military).unwrap().ranking, 40);
    assert!(record.position(ScoreCategory::Honor).is_none());
}
