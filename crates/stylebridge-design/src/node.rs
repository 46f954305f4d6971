//! Design document node model.
//!
//! Nodes are decoded from the design service's JSON. The node kind is a
//! closed tagged union: attribute groups only exist on the kinds that carry
//! them, and callers ask for a capability ([`NodeKind::visual`],
//! [`NodeKind::text_style`]) instead of probing for fields.

use serde::{Deserialize, Serialize};

/// An RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "one")]
    pub a: f64,
}

impl Rgba {
    /// Create a color from channels in `[0, 1]`.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// A 2D offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

/// Paint type of a fill or stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintKind {
    Solid,
    GradientLinear,
    GradientRadial,
    GradientAngular,
    GradientDiamond,
    Image,
    #[serde(other)]
    Other,
}

/// A fill or stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type")]
    pub kind: PaintKind,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default = "one")]
    pub opacity: f64,
    #[serde(default)]
    pub color: Option<Rgba>,
}

impl Paint {
    /// A visible solid paint.
    pub fn solid(color: Rgba) -> Self {
        Self {
            kind: PaintKind::Solid,
            visible: true,
            opacity: 1.0,
            color: Some(color),
        }
    }

    /// Set the paint opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// The color of a visible solid paint.
    pub fn solid_color(&self) -> Option<&Rgba> {
        match self.kind {
            PaintKind::Solid if self.visible => self.color.as_ref(),
            _ => None,
        }
    }
}

/// Effect type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    DropShadow,
    InnerShadow,
    LayerBlur,
    BackgroundBlur,
    #[serde(other)]
    Other,
}

/// A layer effect (shadow or blur).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    #[serde(default = "yes")]
    pub visible: bool,
    #[serde(default)]
    pub color: Option<Rgba>,
    #[serde(default)]
    pub offset: Vector,
    #[serde(default)]
    pub radius: f64,
}

impl Effect {
    /// A visible shadow effect.
    pub fn shadow(kind: EffectKind, color: Rgba, offset: Vector, radius: f64) -> Self {
        Self {
            kind,
            visible: true,
            color: Some(color),
            offset,
            radius,
        }
    }
}

/// Typography attributes of a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_weight: Option<f64>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub line_height_px: Option<f64>,
}

/// Visual attributes shared by shape-like nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visual {
    #[serde(default)]
    pub fills: Vec<Paint>,
    #[serde(default)]
    pub strokes: Vec<Paint>,
    #[serde(default)]
    pub stroke_weight: Option<f64>,
    #[serde(default)]
    pub corner_radius: Option<f64>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Visual {
    /// Add a fill.
    pub fn with_fill(mut self, paint: Paint) -> Self {
        self.fills.push(paint);
        self
    }

    /// Add a stroke with a weight.
    pub fn with_stroke(mut self, paint: Paint, weight: f64) -> Self {
        self.strokes.push(paint);
        self.stroke_weight = Some(weight);
        self
    }

    /// Set the corner radius.
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = Some(radius);
        self
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Attributes of a text node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(flatten)]
    pub visual: Visual,
    #[serde(default)]
    pub style: Option<TypeStyle>,
    #[serde(default)]
    pub characters: String,
}

/// Attributes of a component instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    #[serde(flatten)]
    pub visual: Visual,
    #[serde(default)]
    pub component_id: Option<String>,
}

/// The kind of a design node, with its kind-specific attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Document,
    Canvas,
    Frame(Visual),
    Group(Visual),
    Component(Visual),
    ComponentSet(Visual),
    Instance(Instance),
    Text(Text),
    Rectangle(Visual),
    Ellipse(Visual),
    Vector(Visual),
    Line(Visual),
    BooleanOperation(Visual),
    #[serde(other)]
    Other,
}

/// Field-less node type, used where attributes are not needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Canvas,
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Text,
    Rectangle,
    Ellipse,
    Vector,
    Line,
    BooleanOperation,
    Other,
}

impl NodeKind {
    /// The field-less type tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Document => NodeType::Document,
            Self::Canvas => NodeType::Canvas,
            Self::Frame(_) => NodeType::Frame,
            Self::Group(_) => NodeType::Group,
            Self::Component(_) => NodeType::Component,
            Self::ComponentSet(_) => NodeType::ComponentSet,
            Self::Instance(_) => NodeType::Instance,
            Self::Text(_) => NodeType::Text,
            Self::Rectangle(_) => NodeType::Rectangle,
            Self::Ellipse(_) => NodeType::Ellipse,
            Self::Vector(_) => NodeType::Vector,
            Self::Line(_) => NodeType::Line,
            Self::BooleanOperation(_) => NodeType::BooleanOperation,
            Self::Other => NodeType::Other,
        }
    }

    /// Visual attributes, for kinds that have them.
    pub fn visual(&self) -> Option<&Visual> {
        match self {
            Self::Frame(v)
            | Self::Group(v)
            | Self::Component(v)
            | Self::ComponentSet(v)
            | Self::Rectangle(v)
            | Self::Ellipse(v)
            | Self::Vector(v)
            | Self::Line(v)
            | Self::BooleanOperation(v) => Some(v),
            Self::Instance(instance) => Some(&instance.visual),
            Self::Text(text) => Some(&text.visual),
            Self::Document | Self::Canvas | Self::Other => None,
        }
    }

    /// Typography, for text nodes.
    pub fn text_style(&self) -> Option<&TypeStyle> {
        match self {
            Self::Text(text) => text.style.as_ref(),
            _ => None,
        }
    }

    /// The referenced component id, for instances.
    pub fn component_id(&self) -> Option<&str> {
        match self {
            Self::Instance(instance) => instance.component_id.as_deref(),
            _ => None,
        }
    }
}

/// A node of the design document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<DesignNode>,
}

impl DesignNode {
    /// Create a node without children.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            children: vec![],
        }
    }

    /// Set the children.
    pub fn with_children(mut self, children: Vec<DesignNode>) -> Self {
        self.children = children;
        self
    }

    /// The field-less type tag.
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Depth-first, pre-order iteration over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Find a node by id in this subtree.
    pub fn find(&self, id: &str) -> Option<&DesignNode> {
        self.descendants().find(|node| node.id == id)
    }
}

/// Iterator returned by [`DesignNode::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a DesignNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a DesignNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

fn one() -> f64 {
    1.0
}

fn yes() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_text_node() {
        let json = r#"{
            "id": "1:2",
            "name": "Label",
            "type": "TEXT",
            "characters": "Buy",
            "fills": [{ "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1, "a": 1 } }],
            "style": { "fontFamily": "Inter", "fontWeight": 600, "fontSize": 14, "lineHeightPx": 20 }
        }"#;
        let node: DesignNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.node_type(), NodeType::Text);
        let style = node.kind.text_style().unwrap();
        assert_eq!(style.font_family.as_deref(), Some("Inter"));
        assert_eq!(style.font_size, Some(14.0));
        assert_eq!(node.kind.visual().unwrap().fills.len(), 1);
    }

    #[test]
    fn decode_instance_and_unknown_kinds() {
        let json = r#"{
            "id": "0:1",
            "name": "Page",
            "type": "CANVAS",
            "children": [
                { "id": "1:1", "name": "Icon", "type": "INSTANCE", "componentId": "9:9" },
                { "id": "1:2", "name": "Slice", "type": "SLICE" }
            ]
        }"#;
        let node: DesignNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.node_type(), NodeType::Canvas);
        assert!(node.kind.visual().is_none());
        assert_eq!(node.children[0].kind.component_id(), Some("9:9"));
        assert_eq!(node.children[1].node_type(), NodeType::Other);
    }

    #[test]
    fn unknown_paint_kinds_decode() {
        let json = r#"{ "type": "GRADIENT_CONIC", "opacity": 0.5 }"#;
        let paint: Paint = serde_json::from_str(json).unwrap();
        assert_eq!(paint.kind, PaintKind::Other);
        assert!(paint.solid_color().is_none());
    }

    #[test]
    fn descendants_are_preorder() {
        let tree = DesignNode::new("a", "A", NodeKind::Frame(Visual::default())).with_children(vec![
            DesignNode::new("b", "B", NodeKind::Group(Visual::default()))
                .with_children(vec![DesignNode::new("c", "C", NodeKind::Other)]),
            DesignNode::new("d", "D", NodeKind::Other),
        ]);

        let ids: Vec<_> = tree.descendants().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(tree.find("c").map(|n| n.name.as_str()), Some("C"));
    }
}
