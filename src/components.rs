//! Type-keyed drawing components for node shapes, edge styles and node labels.
//!
//! Every [`RenderNode`] and [`RenderEdge`] names its component through a type
//! key (`circle`, `line`, `default`, ...). The [`ShapeRegistry`] maps those keys
//! to components; an unknown key fails the render instead of dropping the
//! element.

use crate::config::Settings;
use crate::error::{RenderError, Result};
use crate::reduce::{RenderEdge, RenderNode};
use crate::svg::{escape_xml, push_num, push_num_attr};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeCategory {
    Node,
    Edge,
    NodeLabel,
}

impl fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::NodeLabel => "node label",
        })
    }
}

pub trait NodeComponent: Send + Sync {
    fn render(&self, settings: &Settings, node: &RenderNode) -> String;
}

pub trait EdgeComponent: Send + Sync {
    fn render(
        &self,
        settings: &Settings,
        edge: &RenderEdge,
        source: &RenderNode,
        target: &RenderNode,
    ) -> String;
}

pub trait LabelComponent: Send + Sync {
    fn render(&self, settings: &Settings, node: &RenderNode) -> String;
}

impl<F> NodeComponent for F
where
    F: Fn(&Settings, &RenderNode) -> String + Send + Sync,
{
    fn render(&self, settings: &Settings, node: &RenderNode) -> String {
        self(settings, node)
    }
}

impl<F> EdgeComponent for F
where
    F: Fn(&Settings, &RenderEdge, &RenderNode, &RenderNode) -> String + Send + Sync,
{
    fn render(
        &self,
        settings: &Settings,
        edge: &RenderEdge,
        source: &RenderNode,
        target: &RenderNode,
    ) -> String {
        self(settings, edge, source, target)
    }
}

impl<F> LabelComponent for F
where
    F: Fn(&Settings, &RenderNode) -> String + Send + Sync,
{
    fn render(&self, settings: &Settings, node: &RenderNode) -> String {
        self(settings, node)
    }
}

static BUILTIN: Lazy<ShapeRegistry> = Lazy::new(ShapeRegistry::with_builtins);

#[derive(Clone, Default)]
pub struct ShapeRegistry {
    nodes: HashMap<String, Arc<dyn NodeComponent>>,
    edges: HashMap<String, Arc<dyn EdgeComponent>>,
    labels: HashMap<String, Arc<dyn LabelComponent>>,
}

impl ShapeRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared registry holding the built-in components.
    pub fn builtin() -> &'static ShapeRegistry {
        &BUILTIN
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register_node_shape("circle", circle_node);
        registry.register_node_shape("square", square_node);
        registry.register_edge_style("line", line_edge);
        registry.register_edge_style("dashed", dashed_edge);
        registry.register_label_style("default", default_label);
        registry
    }

    pub fn register_node_shape(&mut self, key: &str, component: impl NodeComponent + 'static) -> &mut Self {
        self.nodes.insert(key.to_string(), Arc::new(component));
        self
    }

    pub fn register_edge_style(&mut self, key: &str, component: impl EdgeComponent + 'static) -> &mut Self {
        self.edges.insert(key.to_string(), Arc::new(component));
        self
    }

    pub fn register_label_style(&mut self, key: &str, component: impl LabelComponent + 'static) -> &mut Self {
        self.labels.insert(key.to_string(), Arc::new(component));
        self
    }

    pub fn node_shape(&self, key: &str) -> Result<&dyn NodeComponent> {
        self.nodes
            .get(key)
            .map(|component| component.as_ref())
            .ok_or_else(|| unsupported(ShapeCategory::Node, key))
    }

    pub fn edge_style(&self, key: &str) -> Result<&dyn EdgeComponent> {
        self.edges
            .get(key)
            .map(|component| component.as_ref())
            .ok_or_else(|| unsupported(ShapeCategory::Edge, key))
    }

    pub fn label_style(&self, key: &str) -> Result<&dyn LabelComponent> {
        self.labels
            .get(key)
            .map(|component| component.as_ref())
            .ok_or_else(|| unsupported(ShapeCategory::NodeLabel, key))
    }

    /// Registered keys of a category, sorted.
    pub fn keys(&self, category: ShapeCategory) -> Vec<&str> {
        let mut keys: Vec<&str> = match category {
            ShapeCategory::Node => self.nodes.keys().map(String::as_str).collect(),
            ShapeCategory::Edge => self.edges.keys().map(String::as_str).collect(),
            ShapeCategory::NodeLabel => self.labels.keys().map(String::as_str).collect(),
        };
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeRegistry")
            .field("nodes", &self.keys(ShapeCategory::Node))
            .field("edges", &self.keys(ShapeCategory::Edge))
            .field("labels", &self.keys(ShapeCategory::NodeLabel))
            .finish()
    }
}

fn unsupported(category: ShapeCategory, key: &str) -> RenderError {
    RenderError::UnsupportedType {
        category,
        key: key.to_string(),
    }
}

pub fn circle_node(_settings: &Settings, node: &RenderNode) -> String {
    let mut out = String::from("<circle");
    push_num_attr(&mut out, "cx", node.x);
    push_num_attr(&mut out, "cy", node.y);
    push_num_attr(&mut out, "r", node.size);
    out.push_str(&format!(" fill=\"{}\" />", escape_xml(&node.color)));
    out
}

pub fn square_node(_settings: &Settings, node: &RenderNode) -> String {
    let mut out = String::from("<rect");
    push_num_attr(&mut out, "x", node.x - node.size);
    push_num_attr(&mut out, "y", node.y - node.size);
    push_num_attr(&mut out, "width", node.size * 2.0);
    push_num_attr(&mut out, "height", node.size * 2.0);
    out.push_str(&format!(" fill=\"{}\" />", escape_xml(&node.color)));
    out
}

pub fn line_edge(
    _settings: &Settings,
    edge: &RenderEdge,
    source: &RenderNode,
    target: &RenderNode,
) -> String {
    let mut out = String::from("<line");
    push_line_coords(&mut out, source, target);
    out.push_str(&format!(" stroke=\"{}\"", escape_xml(&edge.color)));
    push_num_attr(&mut out, "stroke-width", edge.size);
    out.push_str(" />");
    out
}

pub fn dashed_edge(
    _settings: &Settings,
    edge: &RenderEdge,
    source: &RenderNode,
    target: &RenderNode,
) -> String {
    let mut out = String::from("<line");
    push_line_coords(&mut out, source, target);
    out.push_str(&format!(" stroke=\"{}\"", escape_xml(&edge.color)));
    push_num_attr(&mut out, "stroke-width", edge.size);
    out.push_str(" stroke-dasharray=\"");
    push_num(&mut out, edge.size * 4.0);
    out.push(' ');
    push_num(&mut out, edge.size * 3.0);
    out.push_str("\" />");
    out
}

fn push_line_coords(out: &mut String, source: &RenderNode, target: &RenderNode) {
    push_num_attr(out, "x1", source.x);
    push_num_attr(out, "y1", source.y);
    push_num_attr(out, "x2", target.x);
    push_num_attr(out, "y2", target.y);
}

/// Text to the right of the node, vertically centred on it. Unlabelled nodes
/// draw nothing.
pub fn default_label(settings: &Settings, node: &RenderNode) -> String {
    let Some(label) = node.label.as_deref() else {
        return String::new();
    };
    let labels = &settings.node_labels;
    let mut out = String::from("<text");
    push_num_attr(&mut out, "x", node.x + node.size * 1.1);
    push_num_attr(&mut out, "y", node.y + labels.font_size / 3.0);
    out.push_str(&format!(
        " font-family=\"{}\" font-size=\"",
        escape_xml(&labels.font_family)
    ));
    push_num(&mut out, labels.font_size);
    out.push_str(&format!(
        "\" fill=\"{}\">{}</text>",
        escape_xml(&labels.color),
        escape_xml(label)
    ));
    out
}
