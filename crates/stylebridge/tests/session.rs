//! Session lifecycle: freshness, failures and cancellation.

use std::sync::Arc;

use stylebridge::Error;
use stylebridge::prelude::*;
use stylebridge_core::Error as CoreError;

fn snapshot(last_modified: &str, radius: u32) -> DesignSnapshot {
    DesignSnapshot::from_json(&format!(
        r#"{{
            "lastModified": "{last_modified}",
            "document": {{
                "id": "0:0", "name": "Page", "type": "DOCUMENT",
                "children": [{{ "id": "1:1", "name": "Chip", "type": "RECTANGLE", "cornerRadius": {radius} }}]
            }}
        }}"#
    ))
    .unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn refresh_skips_unchanged_documents() {
    init_tracing();
    let mut source = MemorySource::new();
    source.insert("doc", snapshot("v1", 4));

    let mut session = Session::new(SyncConfig::for_document("doc"));
    assert!(pollster::block_on(session.refresh_design(&source)).unwrap());
    let first = Arc::clone(session.layers().unwrap());

    // Same version, different content: still treated as unchanged.
    source.insert("doc", snapshot("v1", 8));
    assert!(!pollster::block_on(session.refresh_design(&source)).unwrap());
    assert!(Arc::ptr_eq(&first, session.layers().unwrap()));

    source.insert("doc", snapshot("v2", 8));
    assert!(pollster::block_on(session.refresh_design(&source)).unwrap());
    let layers = session.layers().unwrap();
    let chip = layers.find(&LayerId::new("doc", "1:1")).unwrap();
    assert_eq!(layers.derived_style(chip).get("border-radius"), Some("8px"));
}

#[test]
fn fetch_failure_keeps_the_current_design() {
    init_tracing();
    let mut source = MemorySource::new();
    source.insert("doc", snapshot("v1", 4));

    let mut session = Session::new(SyncConfig::for_document("doc"));
    pollster::block_on(session.refresh_design(&source)).unwrap();
    session.parse_stylesheet(".chip { border-radius: 2px; }").unwrap();
    session.link(LayerId::new("doc", "1:1"), "body .chip");
    let before = session.diagnostics();

    let empty = MemorySource::new();
    let err = pollster::block_on(session.refresh_design(&empty)).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::Fetch { ref key, .. }) if key == "doc"));
    assert!(matches!(session.status(), SessionStatus::Failed(_)));
    assert_eq!(session.diagnostics(), before);

    // The next good refresh clears the failure.
    source.insert("doc", snapshot("v2", 2));
    pollster::block_on(session.refresh_design(&source)).unwrap();
    assert_eq!(session.status(), &SessionStatus::Ready);
    assert!(session.diagnostics().is_empty());
}

#[test]
fn dropped_parse_is_cancelled() {
    let mut session = Session::new(SyncConfig::for_document("doc"));
    let pending = {
        let mut queue = TaskQueue::new();
        session.parse_deferred(".a { color: red; }", &mut queue)
    };

    let err = pollster::block_on(session.receive_stylesheet(pending)).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::Cancelled)));
    assert!(session.scopes().is_none());
}

#[test]
fn deferred_parse_errors_reject() {
    let mut session = Session::new(SyncConfig::for_document("doc"));
    session.parse_stylesheet(".a { color: red; }").unwrap();

    let mut queue = TaskQueue::new();
    let pending = session.parse_deferred(".a { color: blue; }}", &mut queue);
    queue.process_all();

    let err = pollster::block_on(session.receive_stylesheet(pending)).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::Rejected(_))));

    let scopes = session.scopes().unwrap();
    let a = scopes.get_scope("body .a").unwrap();
    assert_eq!(scopes.computed_style(a).properties().get("color"), Some("red"));
}

#[test]
fn custom_base_selector_names_scopes() {
    let config = SyncConfig::from_toml_str(
        r##"
        document_key = "doc"
        base_selector = "#app"
        global_selectors = ["#app", ":root"]
        "##,
    )
    .unwrap();
    let mut session = Session::new(config);
    session
        .parse_stylesheet(":root { font-size: 14px; }\n.title { color: red; }\n")
        .unwrap();

    let scopes = session.scopes().unwrap();
    let title = scopes.get_scope("#app .title").unwrap();
    assert_eq!(scopes.computed_style(title).properties().get("font-size"), Some("14px"));
}
