//! Dependency ordering of components.
//!
//! Components that contain instances of other components must be processed
//! after those components. [`order_components`] produces such an order with
//! a fixed-point pass: each round moves every component whose dependencies
//! are all already sorted, until a round makes no progress. Components caught
//! in a cycle or depending on an unknown component are dropped from the
//! result and logged, never reported as an error.

use std::collections::{BTreeSet, HashMap, HashSet};

use stylebridge_core::logging::targets;

use crate::node::{DesignNode, NodeType};

/// `component id -> ids of components it instantiates`.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    depends_on: HashMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Collect the instance references of each component.
    ///
    /// A component instantiating itself is not a dependency.
    pub fn from_components(components: &[&DesignNode]) -> Self {
        let depends_on = components
            .iter()
            .map(|component| {
                let dependencies = component
                    .descendants()
                    .skip(1)
                    .filter_map(|node| node.kind.component_id())
                    .filter(|id| *id != component.id)
                    .map(str::to_string)
                    .collect();
                (component.id.clone(), dependencies)
            })
            .collect();
        Self { depends_on }
    }

    /// Dependencies of a component.
    pub fn dependencies(&self, component_id: &str) -> impl Iterator<Item = &str> {
        self.depends_on
            .get(component_id)
            .into_iter()
            .flat_map(|deps| deps.iter().map(String::as_str))
    }
}

/// Order components so that each follows every component it instantiates.
///
/// Components whose dependencies never resolve are left out.
pub fn order_components<'a>(components: &[&'a DesignNode]) -> Vec<&'a DesignNode> {
    let graph = DependencyGraph::from_components(components);
    let mut remaining: Vec<&'a DesignNode> = components.to_vec();
    let mut sorted: Vec<&'a DesignNode> = Vec::with_capacity(components.len());
    let mut sorted_ids: HashSet<&'a str> = HashSet::new();

    loop {
        let before = sorted.len();
        remaining.retain(|&component| {
            let ready = graph
                .dependencies(&component.id)
                .all(|dep| sorted_ids.contains(dep));
            if ready {
                sorted_ids.insert(component.id.as_str());
                sorted.push(component);
            }
            !ready
        });
        if sorted.len() == before || remaining.is_empty() {
            break;
        }
    }

    for dropped in &remaining {
        let unresolved: Vec<&str> = graph
            .dependencies(&dropped.id)
            .filter(|dep| !sorted_ids.contains(*dep))
            .collect();
        tracing::warn!(
            target: targets::DESIGN,
            component = %dropped.id,
            name = %dropped.name,
            unresolved = ?unresolved,
            "dropping component with unresolved dependencies"
        );
    }

    sorted
}

/// All component nodes in a document, in document order.
pub fn collect_components(root: &DesignNode) -> Vec<&DesignNode> {
    root.descendants()
        .filter(|node| node.node_type() == NodeType::Component)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Instance, NodeKind, Visual};

    fn instance(id: &str, target: &str) -> DesignNode {
        DesignNode::new(
            id,
            "instance",
            NodeKind::Instance(Instance {
                visual: Visual::default(),
                component_id: Some(target.to_string()),
            }),
        )
    }

    fn component(id: &str, children: Vec<DesignNode>) -> DesignNode {
        DesignNode::new(id, id, NodeKind::Component(Visual::default())).with_children(children)
    }

    fn ids<'a>(nodes: &[&'a DesignNode]) -> Vec<&'a str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn dependencies_come_first_and_unknown_are_dropped() {
        let a = component("A", vec![instance("a1", "B")]);
        let b = component("B", vec![]);
        let c = component("C", vec![instance("c1", "missing")]);

        let ordered = order_components(&[&a, &b, &c]);
        assert_eq!(ids(&ordered), vec!["B", "A"]);
    }

    #[test]
    fn cycles_are_dropped() {
        let a = component("A", vec![instance("a1", "B")]);
        let b = component("B", vec![instance("b1", "A")]);
        let d = component("D", vec![]);

        let ordered = order_components(&[&a, &b, &d]);
        assert_eq!(ids(&ordered), vec!["D"]);
    }

    #[test]
    fn chains_resolve_over_several_passes() {
        let a = component("A", vec![instance("a1", "B")]);
        let b = component("B", vec![instance("b1", "C")]);
        let c = component("C", vec![]);

        let ordered = order_components(&[&a, &b, &c]);
        assert_eq!(ids(&ordered), vec!["C", "B", "A"]);
    }

    #[test]
    fn self_instances_are_ignored() {
        let a = component("A", vec![instance("a1", "A")]);
        let graph = DependencyGraph::from_components(&[&a]);
        assert_eq!(graph.dependencies("A").count(), 0);
        assert_eq!(ids(&order_components(&[&a])), vec!["A"]);
    }

    #[test]
    fn nested_instances_count() {
        let wrapper = DesignNode::new("g", "group", NodeKind::Group(Visual::default()))
            .with_children(vec![instance("a1", "B")]);
        let a = component("A", vec![wrapper]);
        let graph = DependencyGraph::from_components(&[&a]);
        assert_eq!(graph.dependencies("A").collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn collect_components_in_document_order() {
        let page = DesignNode::new("p", "Page", NodeKind::Canvas)
            .with_children(vec![component("A", vec![]), component("B", vec![])]);
        assert_eq!(ids(&collect_components(&page)), vec!["A", "B"]);
    }
}
