//! LESS rule generation for components.
//!
//! Every component whose description carries a selector directive becomes a
//! rule. Components are visited in dependency order so that an instance of
//! another component can be written as a nested rule using that component's
//! selector.

use std::collections::HashMap;
use std::fmt::{self, Write as _};

use stylebridge_core::logging::targets;

use crate::directive::selector_directive;
use crate::layer::{LayerKey, LayerTree};
use crate::node::{DesignNode, NodeType};
use crate::order::{collect_components, order_components};
use crate::source::ComponentMeta;

/// LESS source generated for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRule {
    /// Design node id of the component.
    pub component_id: String,
    /// Selector taken from the component's directive.
    pub selector: String,
    /// The rule text, ending in a newline.
    pub less: String,
}

/// Writes LESS rules for the components of one layer tree.
#[derive(Debug)]
pub struct RuleGenerator<'a> {
    tree: &'a LayerTree,
    components: &'a HashMap<String, ComponentMeta>,
    indent: &'static str,
}

impl<'a> RuleGenerator<'a> {
    /// Create a generator over a tree and its component metadata.
    pub fn new(tree: &'a LayerTree, components: &'a HashMap<String, ComponentMeta>) -> Self {
        Self {
            tree,
            components,
            indent: "  ",
        }
    }

    /// Generate rules for every tagged component under `root`.
    ///
    /// `root` must be the node the tree was built from.
    pub fn generate(&self, root: &DesignNode) -> Vec<GeneratedRule> {
        let components = collect_components(root);
        let mut selectors: HashMap<&str, &str> = HashMap::new();
        let mut rules = Vec::new();

        for component in order_components(&components) {
            let Some(selector) = self
                .components
                .get(&component.id)
                .and_then(|meta| selector_directive(&meta.description))
            else {
                tracing::debug!(
                    target: targets::DESIGN,
                    component = %component.id,
                    "component has no selector directive"
                );
                continue;
            };
            let Some(key) = self.tree.find_node(&component.id) else {
                continue;
            };

            let mut less = String::new();
            if let Err(error) = self.write_block(&mut less, selector, key, 0, &selectors) {
                tracing::warn!(
                    target: targets::DESIGN,
                    component = %component.id,
                    %error,
                    "failed to write component rule"
                );
                continue;
            }
            selectors.insert(component.id.as_str(), selector);
            rules.push(GeneratedRule {
                component_id: component.id.clone(),
                selector: selector.to_string(),
                less,
            });
        }

        rules
    }

    fn write_block(
        &self,
        out: &mut String,
        selector: &str,
        key: LayerKey,
        depth: usize,
        generated: &HashMap<&str, &str>,
    ) -> fmt::Result {
        let Some(layer) = self.tree.get(key) else {
            return Ok(());
        };
        let pad = self.indent.repeat(depth);
        writeln!(out, "{pad}{selector} {{")?;
        for (name, value) in layer.own_style.iter() {
            writeln!(out, "{pad}{}{name}: {value};", self.indent)?;
        }

        for &child_key in self.tree.pruned_children(key) {
            let Some(child) = self.tree.get(child_key) else {
                continue;
            };
            if child.node_type == NodeType::Instance {
                let dependency = child
                    .component_id
                    .as_deref()
                    .and_then(|id| generated.get(id));
                // Instance internals belong to the instantiated component's rule.
                if let Some(dependency) = dependency
                    && !child.own_style.is_empty()
                {
                    self.write_block(out, dependency, child_key, depth + 1, &HashMap::new())?;
                }
                continue;
            }
            if self.tree.derived_style(child_key).is_empty() {
                continue;
            }
            let class = kebab_case(&child.name);
            if class.is_empty() {
                continue;
            }
            self.write_block(out, &format!(".{class}"), child_key, depth + 1, generated)?;
        }

        writeln!(out, "{pad}}}")
    }
}

/// Generate rules for a document in one call.
pub fn generate_rules(
    root: &DesignNode,
    tree: &LayerTree,
    components: &HashMap<String, ComponentMeta>,
) -> Vec<GeneratedRule> {
    RuleGenerator::new(tree, components).generate(root)
}

/// Lowercase a layer name and join its alphanumeric runs with `-`.
pub fn kebab_case(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Instance, NodeKind, Paint, Rgba, Text, TypeStyle, Visual};

    fn meta(description: &str) -> ComponentMeta {
        ComponentMeta {
            name: String::new(),
            description: description.to_string(),
        }
    }

    fn label(id: &str, name: &str) -> DesignNode {
        DesignNode::new(
            id,
            name,
            NodeKind::Text(Text {
                visual: Visual::default().with_fill(Paint::solid(Rgba::rgb(1.0, 1.0, 1.0))),
                style: Some(TypeStyle {
                    font_size: Some(14.0),
                    ..TypeStyle::default()
                }),
                characters: String::new(),
            }),
        )
    }

    fn document() -> DesignNode {
        let icon = DesignNode::new(
            "10:1",
            "Icon",
            NodeKind::Component(Visual::default().with_corner_radius(2.0)),
        );
        let button = DesignNode::new(
            "10:2",
            "Button",
            NodeKind::Component(Visual::default().with_fill(Paint::solid(Rgba::rgb(0.0, 0.0, 0.0)))),
        )
        .with_children(vec![
            label("10:3", "Primary Label"),
            DesignNode::new(
                "10:4",
                "icon",
                NodeKind::Instance(Instance {
                    visual: Visual::default().with_corner_radius(4.0),
                    component_id: Some("10:1".into()),
                }),
            ),
        ]);
        DesignNode::new("0:0", "Document", NodeKind::Document)
            .with_children(vec![DesignNode::new("0:1", "Page", NodeKind::Canvas).with_children(vec![button, icon])])
    }

    #[test]
    fn kebab_names() {
        assert_eq!(kebab_case("Primary Label"), "primary-label");
        assert_eq!(kebab_case("  Icon/Left_2 "), "icon-left-2");
        assert_eq!(kebab_case("--"), "");
    }

    #[test]
    fn rules_follow_dependency_order() {
        let root = document();
        let tree = LayerTree::build("kit", &root);
        let components = HashMap::from([
            ("10:1".to_string(), meta("<.icon>")),
            ("10:2".to_string(), meta("Main button <.button>")),
        ]);

        let rules = generate_rules(&root, &tree, &components);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, ".icon");
        assert_eq!(rules[0].less, ".icon {\n  border-radius: 2px;\n}\n");

        assert_eq!(rules[1].component_id, "10:2");
        assert_eq!(
            rules[1].less,
            ".button {\n  background-color: #000000;\n  .primary-label {\n    font-size: 14px;\n    color: #FFFFFF;\n  }\n  .icon {\n    border-radius: 4px;\n  }\n}\n"
        );
    }

    #[test]
    fn untagged_components_are_skipped() {
        let root = document();
        let tree = LayerTree::build("kit", &root);
        let components = HashMap::from([("10:2".to_string(), meta("no directive"))]);
        assert!(generate_rules(&root, &tree, &components).is_empty());
    }

    #[test]
    fn instances_of_ungenerated_components_are_omitted() {
        let root = document();
        let tree = LayerTree::build("kit", &root);
        let components = HashMap::from([("10:2".to_string(), meta("<.button>"))]);

        let rules = generate_rules(&root, &tree, &components);
        assert_eq!(rules.len(), 1);
        assert!(!rules[0].less.contains(".icon"));
    }

    #[test]
    fn write_block_indents_by_depth() {
        let root = document();
        let tree = LayerTree::build("kit", &root);
        let components = HashMap::new();
        let generator = RuleGenerator::new(&tree, &components);
        let icon = tree.find_node("10:1").unwrap();

        let mut out = String::new();
        generator.write_block(&mut out, ".icon", icon, 1, &HashMap::new()).unwrap();
        assert_eq!(out, "  .icon {\n    border-radius: 2px;\n  }\n");

        let missing = LayerKey::default();
        let mut out = String::new();
        generator.write_block(&mut out, ".gone", missing, 0, &HashMap::new()).unwrap();
        assert!(out.is_empty());
    }
}
