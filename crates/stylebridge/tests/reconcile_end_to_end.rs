//! End-to-end reconciliation: design JSON and stylesheet text in, diagnostics out.

use stylebridge::prelude::*;

const DESIGN: &str = r#"{
    "name": "Kit",
    "lastModified": "2024-03-01T10:00:00Z",
    "document": {
        "id": "0:0", "name": "Kit", "type": "DOCUMENT",
        "children": [{
            "id": "0:1", "name": "Page", "type": "CANVAS",
            "children": [
                {
                    "id": "1:2", "name": "Button", "type": "COMPONENT",
                    "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }],
                    "strokes": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }],
                    "strokeWeight": 1,
                    "cornerRadius": 4,
                    "children": [{
                        "id": "1:3", "name": "Label", "type": "TEXT",
                        "fills": [{ "type": "SOLID", "color": { "r": 0, "g": 0, "b": 0 } }],
                        "style": { "fontSize": 14, "fontWeight": 600 },
                        "characters": "OK"
                    }]
                },
                {
                    "id": "2:0", "name": "Card", "type": "FRAME",
                    "children": [{
                        "id": "2:1", "name": "Background", "type": "RECTANGLE",
                        "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 0, "b": 0 } }]
                    }]
                }
            ]
        }]
    },
    "components": { "1:2": { "name": "Button", "description": "Primary action <.button>" } }
}"#;

const STYLESHEET: &str = "@brand: #FFFFFF;
.button {
  background: @brand;
  border: 1px solid black;
  border-radius: 4px;
  .label {
    font-size: 14px;
    font-weight: 700;
    color: #000;
  }
}
.card {
  background-color: #F00;
}
";

fn source() -> MemorySource {
    let mut source = MemorySource::new();
    source.insert("doc", DesignSnapshot::from_json(DESIGN).unwrap());
    source
}

fn loaded_session() -> Session {
    let mut session = Session::new(SyncConfig::for_document("doc"));
    assert!(pollster::block_on(session.refresh_design(&source())).unwrap());
    session.parse_stylesheet(STYLESHEET).unwrap();
    session
}

#[test]
fn reports_only_real_disagreements() {
    let mut session = loaded_session();
    session.link(LayerId::new("doc", "1:2"), "body .button");
    session.link(LayerId::new("doc", "1:3"), "body .button .label");
    session.link(LayerId::new("doc", "2:0"), "body .card");
    assert_eq!(session.resolved_links().len(), 3);

    let diagnostics = session.diagnostics();
    assert_eq!(diagnostics.len(), 1, "{diagnostics:?}");

    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.message, "expected font-weight: 600;");
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.range.start.line, 7);
    assert_eq!(diagnostic.scope_id, "body .button .label");
    assert_eq!(diagnostic.layer_id, LayerId::new("doc", "1:3"));
}

#[test]
fn missing_properties_point_at_the_selector() {
    let mut session = loaded_session();
    session.parse_stylesheet(".card {}\n.button {\n  border-radius: 4px;\n}\n").unwrap();
    session.link(LayerId::new("doc", "2:0"), "body .card");
    session.link(LayerId::new("doc", "1:2"), "body .button");

    let diagnostics = session.diagnostics();
    let card: Vec<_> = diagnostics.iter().filter(|d| d.scope_id == "body .card").collect();
    assert_eq!(card.len(), 1);
    assert_eq!(card[0].message, "missing background-color: #FF0000;");
    assert_eq!(card[0].range.start.line, 0);

    let button: Vec<_> = diagnostics
        .iter()
        .filter(|d| d.scope_id == "body .button")
        .map(|d| d.message.as_str())
        .collect();
    assert!(button.contains(&"missing background-color: #FFFFFF;"));
    assert!(button.contains(&"missing border-width: 1px;"));
    assert!(button.iter().all(|message| message.starts_with("missing ")));
    assert!(diagnostics.iter().all(|d| d.scope_id != "body .button" || d.range.start.line == 1));
}

#[test]
fn dangling_links_produce_nothing() {
    let mut session = loaded_session();
    session.link(LayerId::new("doc", "9:9"), "body .button");
    session.link(LayerId::new("doc", "1:2"), "body .nowhere");
    session.link(LayerId::new("other", "1:2"), "body .button");

    assert_eq!(session.links().len(), 3);
    assert!(session.resolved_links().is_empty());
    assert!(session.diagnostics().is_empty());
}

#[test]
fn variables_bound_after_use_stay_literal() {
    let mut session = loaded_session();
    session
        .parse_stylesheet("body { .button { color: @accent; } } @accent: #112233;")
        .unwrap();

    let scopes = session.scopes().unwrap();
    let button = scopes.get_scope("body .button").unwrap();
    assert_eq!(scopes.computed_style(button).properties().get("color"), Some("@accent"));

    session.link(LayerId::new("doc", "1:3"), "body .button");
    let messages: Vec<_> = session.diagnostics().into_iter().map(|d| d.message).collect();
    assert!(messages.contains(&"expected color: #000000;".to_string()), "{messages:?}");
}

#[test]
fn deferred_parse_settles_when_the_queue_runs() {
    let mut session = Session::new(SyncConfig::for_document("doc"));
    pollster::block_on(session.refresh_design(&source())).unwrap();

    let mut queue = TaskQueue::new();
    let pending = session.parse_deferred(STYLESHEET, &mut queue);
    assert!(!pending.is_settled());
    assert_eq!(session.status(), &SessionStatus::Waiting);

    queue.process_all();
    pollster::block_on(session.receive_stylesheet(pending)).unwrap();
    assert_eq!(session.status(), &SessionStatus::Ready);
    assert!(session.scopes().unwrap().get_scope("body .button .label").is_some());
}

#[test]
fn generated_rules_nest_children() {
    let session = loaded_session();
    let rules = session.generated_rules();

    assert_eq!(rules.len(), 1);
    let rule = &rules[0];
    assert_eq!(rule.selector, ".button");
    assert!(rule.less.starts_with(".button {\n"));
    assert!(rule.less.contains("  .label {\n"));
    assert!(rule.less.contains("font-size: 14px;"));
}
