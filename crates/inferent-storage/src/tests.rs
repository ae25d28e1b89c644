//! Document round-trips through strings and files

use super::*;
use inferent_kb::{
    Antecedent, Assignment, Comparator, Condition, Confidence, Consequent, DynamicEnum, EnumFact,
    Literal, Rule, RuleFilter, TypedFact,
};
use tempfile::tempdir;

/// A small system with every fact kind, ranges, and an enum-valued rule.
fn sample() -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.facts
        .create("raining", ValueKind::Bool)
        .unwrap()
        .set_description("Is it raining?");
    if let TypedFact::Int(f) = kb.facts.create("temperature", ValueKind::Int).unwrap() {
        f.set_range(-30, 45, true).unwrap();
    }
    if let TypedFact::Float(f) = kb.facts.create("humidity", ValueKind::Float).unwrap() {
        f.set_range(0.0, 1.0, false).unwrap();
    }
    let mut wind = EnumFact::new(DynamicEnum::from_names(["calm", "breezy", "gale"]));
    wind.set_range_named("calm", "breezy", true).unwrap();
    kb.facts.insert("wind", TypedFact::Enum(wind)).unwrap();
    kb.facts.create("outfit", ValueKind::Enum).unwrap();

    kb.rules
        .insert(
            "umbrella",
            Rule::new(
                Antecedent::new(Condition::new(
                    "raining",
                    Comparator::EqualTo,
                    true,
                    Confidence::new(0.5),
                ))
                .and(
                    Condition::new(
                        "wind",
                        Comparator::GreaterThan,
                        "gale".to_string(),
                        Confidence::NONE,
                    )
                    .inverted(),
                ),
                Consequent::new().with(Assignment::new("humidity", 0.75, Confidence::new(0.9))),
            )
            .with_description("Take an umbrella"),
        )
        .unwrap();
    kb
}

#[test]
fn test_string_round_trip_preserves_definitions() {
    let kb = sample();
    let text = to_json_string(&kb).unwrap();
    let back = from_json_str(&text).unwrap();
    assert_eq!(back, kb);
}

#[test]
fn test_document_layout() {
    let text = to_json_string(&sample()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();

    let raining = &json["database_facts"]["raining"];
    assert_eq!(raining["type"], "Boolean");
    assert_eq!(raining["description"], "Is it raining?");
    assert!(raining["range"].is_null());
    assert!(raining.get("enum").is_none());

    let wind = &json["database_facts"]["wind"];
    assert_eq!(wind["type"], "Enumeration");
    assert_eq!(wind["enum"], serde_json::json!(["calm", "breezy", "gale"]));
    assert_eq!(
        wind["range"],
        serde_json::json!({"min": "calm", "max": "breezy", "inclusive": true})
    );

    let rule = &json["database_rules"]["umbrella"];
    assert_eq!(rule["description"], "Take an umbrella");
    assert_eq!(rule["antecedent"]["root"]["condition"], "EqualTo");
    assert_eq!(rule["antecedent"]["chain"][0][0], "AND");
    assert_eq!(rule["antecedent"]["chain"][0][1]["target_value"], "gale");
    assert_eq!(rule["antecedent"]["chain"][0][1]["invert"], true);
    assert_eq!(rule["consequent"][0]["type"], "Float");
    assert!(rule.get("fired").is_none());
}

#[test]
fn test_enum_ranges_round_trip_exactly() {
    let mut kb = KnowledgeBase::new();
    let mut level = EnumFact::new(DynamicEnum::from_names(["low", "high"]));
    level.set_range_named("low", "high", false).unwrap();
    kb.facts.insert("level", TypedFact::Enum(level)).unwrap();

    let mut retabled = EnumFact::new(DynamicEnum::from_names(["a", "b", "c"]));
    retabled.set_range_named("b", "c", true).unwrap();
    retabled.set_variants(DynamicEnum::from_names(["x"])).unwrap();
    kb.facts.insert("retabled", TypedFact::Enum(retabled)).unwrap();

    let document = Document::from_knowledge_base(&kb).unwrap();
    let level = &document.database_facts["level"];
    assert_eq!(
        level.range,
        Some(RangeRecord {
            min: "low".into(),
            max: "high".into(),
            inclusive: false,
        })
    );
    assert_eq!(document.database_facts["retabled"].range, None);

    let back = from_json_str(&to_json_string(&kb).unwrap()).unwrap();
    assert_eq!(back, kb);
}

#[test]
fn test_session_state_is_not_saved() {
    let mut kb = sample();
    kb.facts
        .assign("raining", &Literal::Bool(true), Confidence::CERTAIN)
        .unwrap();
    kb.rules.get_mut("umbrella").unwrap().mark_fired();

    let back = from_json_str(&to_json_string(&kb).unwrap()).unwrap();

    assert!(!back.facts.known("raining"));
    assert!(back.rules.list(RuleFilter::HasFired).is_empty());
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("weather.json");
    save(&sample(), &path).unwrap();
    assert!(path.exists());
    assert_eq!(load(&path).unwrap(), sample());
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = load(&path).unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn test_bad_documents_name_the_fact() {
    let unknown_enum_bound = r#"{
        "database_facts": {
            "wind": {
                "type": "Enumeration",
                "enum": ["calm"],
                "range": {"min": "calm", "max": "storm", "inclusive": true}
            }
        },
        "database_rules": {}
    }"#;
    let err = from_json_str(unknown_enum_bound).unwrap_err();
    assert!(matches!(&err, StorageError::InvalidFact { fact, .. } if fact == "wind"));

    let inverted = r#"{
        "database_facts": {
            "t": {"type": "Integer", "range": {"min": 5, "max": 1, "inclusive": true}}
        },
        "database_rules": {}
    }"#;
    assert!(matches!(
        from_json_str(inverted),
        Err(StorageError::InvalidFact { source: inferent_kb::KbError::InvertedRange, .. })
    ));

    let wrong_kind = r#"{
        "database_facts": {
            "t": {"type": "Integer", "range": {"min": "low", "max": 1, "inclusive": true}}
        },
        "database_rules": {}
    }"#;
    let err = from_json_str(wrong_kind).unwrap_err();
    assert!(matches!(
        &err,
        StorageError::BadValue { fact, kind: ValueKind::Int, .. } if fact == "t"
    ));
}

#[test]
fn test_malformed_json_is_reported() {
    assert!(matches!(from_json_str("{"), Err(StorageError::Json(_))));
    let bad_kind = r#"{"database_facts": {"x": {"type": "String"}}}"#;
    assert!(matches!(from_json_str(bad_kind), Err(StorageError::Json(_))));
}

#[test]
fn test_sections_default_to_empty() {
    let kb = from_json_str("{}").unwrap();
    assert_eq!(kb.facts.count(), 0);
    assert!(kb.rules.is_empty());
}
