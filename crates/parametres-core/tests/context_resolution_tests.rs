// Integration tests for context-scoped resolution over the memory backend
// Covers the override lifecycle: set, per-context overrides, forget, flush

use parametres_core::{ConfiguredHandler, MemoryHandler, Parametres, StaticDefaults};
use serde_json::json;

fn resolver() -> Parametres {
    let defaults = StaticDefaults::new().with_file("foo", json!({"site_name": "Default Site"}));
    Parametres::new(
        vec![ConfiguredHandler::new(
            "memory",
            Box::new(MemoryHandler::new()),
            true,
        )],
        Box::new(defaults),
    )
}

#[test]
fn test_last_write_wins_per_context() {
    // Given: a general value and overrides under two contexts, one twice
    let mut parametres = resolver();
    parametres.set("foo.site_name", json!("Humpty"), None).unwrap();
    parametres
        .set("foo.site_name", json!("Jack"), Some("context:male"))
        .unwrap();
    parametres
        .set("foo.site_name", json!("Jill"), Some("context:female"))
        .unwrap();
    parametres
        .set("foo.site_name", json!("Jane"), Some("context:female"))
        .unwrap();

    // Then: each scope resolves its own latest value
    assert_eq!(
        parametres.get("foo.site_name", None).unwrap(),
        Some(json!("Humpty"))
    );
    assert_eq!(
        parametres.get("foo.site_name", Some("context:male")).unwrap(),
        Some(json!("Jack"))
    );
    assert_eq!(
        parametres.get("foo.site_name", Some("context:female")).unwrap(),
        Some(json!("Jane"))
    );
}

#[test]
fn test_context_overrides_never_leak_upward() {
    // Given: a value stored only under a context
    let mut parametres = resolver();
    parametres
        .set("foo.site_name", json!("Scoped"), Some("tenant:acme"))
        .unwrap();

    // Then: the general read falls through to the default configuration
    assert_eq!(
        parametres.get("foo.site_name", None).unwrap(),
        Some(json!("Default Site"))
    );
}

#[test]
fn test_forget_one_context_leaves_the_others() {
    // Given: general plus two context overrides
    let mut parametres = resolver();
    parametres.set("foo.site_name", json!("Humpty"), None).unwrap();
    parametres
        .set("foo.site_name", json!("Jack"), Some("context:male"))
        .unwrap();
    parametres
        .set("foo.site_name", json!("Jane"), Some("context:female"))
        .unwrap();

    // When: one context is forgotten
    parametres
        .forget("foo.site_name", Some("context:female"))
        .unwrap();

    // Then: that context degrades to the general value; the rest are intact
    assert_eq!(
        parametres.get("foo.site_name", Some("context:female")).unwrap(),
        Some(json!("Humpty"))
    );
    assert_eq!(
        parametres.get("foo.site_name", Some("context:male")).unwrap(),
        Some(json!("Jack"))
    );
    assert_eq!(
        parametres.get("foo.site_name", None).unwrap(),
        Some(json!("Humpty"))
    );
}

#[test]
fn test_flush_restores_defaults_everywhere() {
    // Given: the full override scenario
    let mut parametres = resolver();
    parametres.set("foo.site_name", json!("Humpty"), None).unwrap();
    parametres
        .set("foo.site_name", json!("Jack"), Some("context:male"))
        .unwrap();
    parametres
        .set("foo.site_name", json!("Jane"), Some("context:female"))
        .unwrap();

    // When: everything is flushed
    parametres.flush().unwrap();

    // Then: every scope resolves the default-configuration value
    for context in [None, Some("context:male"), Some("context:female")] {
        assert_eq!(
            parametres.get("foo.site_name", context).unwrap(),
            Some(json!("Default Site")),
            "context {:?}",
            context
        );
    }

    // And: a namespace without defaults resolves to absent
    assert_eq!(parametres.get("bar.site_name", None).unwrap(), None);
}

#[test]
fn test_type_preservation_through_the_resolver() {
    let mut parametres = resolver();
    let values = [
        json!(null),
        json!(true),
        json!(false),
        json!(42),
        json!(-8),
        json!(2.75),
        json!("plain"),
        json!(["a", "b"]),
        json!({"nested": {"deep": [1, 2, 3]}}),
    ];

    for (index, value) in values.into_iter().enumerate() {
        let key = format!("foo.value_{}", index);
        parametres.set(&key, value.clone(), None).unwrap();
        assert_eq!(parametres.get(&key, None).unwrap(), Some(value));
    }
}
