//! Resolution of raw graph attributes into render-ready records.
//!
//! Both nodes and edges go through the same two steps: the optional user
//! reducer from [`Settings`], then a defaulting pass that only fills fields
//! left unset.

use crate::config::Settings;
use crate::error::{RenderError, Result};
use crate::ir::{Attributes, Graph};
use crate::svg::fmt_num;
use indexmap::IndexMap;
use log::debug;
use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub kind: String,
    pub label_type: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderEdge {
    pub id: String,
    pub color: String,
    pub kind: String,
    pub size: f64,
}

/// Render nodes keyed by id, in graph insertion order.
pub type NodeData = IndexMap<String, RenderNode>;

pub fn reduce_nodes(graph: &Graph, settings: &Settings) -> Result<NodeData> {
    let mut data = NodeData::with_capacity(graph.node_count());
    for (id, raw) in graph.nodes() {
        let node = resolve_node(settings, id, raw)?;
        data.insert(id.to_string(), node);
    }
    if settings.rescale {
        rescale(&mut data, settings)?;
    }
    debug!(nodes = data.len(), rescale = settings.rescale; "Reduced nodes");
    Ok(data)
}

pub fn resolve_node(settings: &Settings, id: &str, raw: &Attributes) -> Result<RenderNode> {
    let attrs = apply_reducer(settings, settings.nodes.reducer.as_ref(), id, raw);

    let x = number_attr(&attrs, "x")
        .ok_or_else(|| RenderError::invalid(format!("node {id:?} has no numeric x position")))?;
    let y = number_attr(&attrs, "y")
        .ok_or_else(|| RenderError::invalid(format!("node {id:?} has no numeric y position")))?;

    let label = label_attr(&attrs);
    let label = match settings.node_labels.reducer.as_ref() {
        Some(reducer) => reducer(settings, id, label),
        None => label,
    };

    Ok(RenderNode {
        id: id.to_string(),
        x,
        y,
        size: number_attr(&attrs, "size").unwrap_or(settings.nodes.default_size),
        color: string_attr(&attrs, "color").unwrap_or_else(|| settings.nodes.default_color.clone()),
        kind: string_attr(&attrs, "type").unwrap_or_else(|| settings.nodes.default_type.clone()),
        label_type: string_attr(&attrs, "labelType")
            .unwrap_or_else(|| settings.node_labels.default_type.clone()),
        label,
    })
}

pub fn resolve_edge(settings: &Settings, id: &str, raw: &Attributes) -> RenderEdge {
    let attrs = apply_reducer(settings, settings.edges.reducer.as_ref(), id, raw);
    RenderEdge {
        id: id.to_string(),
        color: string_attr(&attrs, "color").unwrap_or_else(|| settings.edges.default_color.clone()),
        kind: string_attr(&attrs, "type").unwrap_or_else(|| settings.edges.default_type.clone()),
        size: number_attr(&attrs, "size").unwrap_or(settings.edges.default_size),
    }
}

fn apply_reducer<'a>(
    settings: &Settings,
    reducer: Option<&crate::config::AttributeReducer>,
    id: &str,
    raw: &'a Attributes,
) -> Cow<'a, Attributes> {
    match reducer {
        Some(reducer) => Cow::Owned(reducer(settings, id, raw)),
        None => Cow::Borrowed(raw),
    }
}

/// Fits positions into the viewport around the size-weighted barycenter.
fn rescale(data: &mut NodeData, settings: &Settings) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    let total_weight: f64 = data.values().map(|node| node.size).sum();
    let (bx, by) = if total_weight > 0.0 {
        let x = data.values().map(|node| node.size * node.x).sum::<f64>();
        let y = data.values().map(|node| node.size * node.y).sum::<f64>();
        (x / total_weight, y / total_weight)
    } else {
        let count = data.len() as f64;
        let x = data.values().map(|node| node.x).sum::<f64>();
        let y = data.values().map(|node| node.y).sum::<f64>();
        (x / count, y / count)
    };

    let d_max = data
        .values()
        .map(|node| (node.x - bx).hypot(node.y - by))
        .fold(0.0_f64, f64::max);

    let cx = settings.width / 2.0;
    let cy = settings.height / 2.0;
    if d_max == 0.0 {
        for node in data.values_mut() {
            node.x = cx;
            node.y = cy;
        }
        return Ok(());
    }

    let ratio = (settings.width.min(settings.height) - 2.0 * settings.margin).max(0.0) / (2.0 * d_max);
    for node in data.values_mut() {
        node.x = cx + (node.x - bx) * ratio;
        node.y = cy + (node.y - by) * ratio;
        if !node.x.is_finite() || !node.y.is_finite() {
            return Err(RenderError::invalid(format!(
                "node {:?} cannot be fitted into the viewport",
                node.id
            )));
        }
    }
    Ok(())
}

fn string_attr(attrs: &Attributes, key: &str) -> Option<String> {
    match attrs.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

fn number_attr(attrs: &Attributes, key: &str) -> Option<f64> {
    attrs.get(key).and_then(Value::as_f64).filter(|value| value.is_finite())
}

fn label_attr(attrs: &Attributes) -> Option<String> {
    match attrs.get("label") {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        // Zero is falsy and hides the label, like an empty string.
        Some(Value::Number(value)) => value
            .as_f64()
            .filter(|number| *number != 0.0 && !number.is_nan())
            .map(fmt_num),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn edge_defaults_fill_missing_fields() {
        let settings = Settings::default();
        let edge = resolve_edge(&settings, "e0", &Attributes::new());
        assert_eq!(edge.color, "#ccc");
        assert_eq!(edge.kind, "line");
        assert_eq!(edge.size, 1.0);
    }

    #[test]
    fn edge_reducer_wins_over_defaults() {
        let settings = Settings::default().with_edge_reducer(|_, _, raw| {
            let mut out = raw.clone();
            out.insert("color".to_string(), json!("red"));
            out
        });
        let edge = resolve_edge(&settings, "e0", &attrs(json!({"size": 3})));
        assert_eq!(edge.color, "red");
        assert_eq!(edge.size, 3.0);
        assert_eq!(edge.kind, "line");
    }

    #[test]
    fn edge_reducer_may_replace_attributes() {
        let settings = Settings::default().with_edge_reducer(|_, id, _| {
            attrs(json!({"type": format!("{id}-style")}))
        });
        let edge = resolve_edge(&settings, "e7", &attrs(json!({"color": "blue"})));
        assert_eq!(edge.kind, "e7-style");
        assert_eq!(edge.color, "#ccc");
    }

    #[test]
    fn empty_and_mistyped_values_count_as_unset() {
        let settings = Settings::default();
        let edge = resolve_edge(&settings, "e0", &attrs(json!({"color": "", "type": 4, "size": "big"})));
        assert_eq!(edge.color, "#ccc");
        assert_eq!(edge.kind, "line");
        assert_eq!(edge.size, 1.0);
    }

    #[test]
    fn node_requires_position() {
        let settings = Settings::default();
        let err = resolve_node(&settings, "a", &attrs(json!({"x": 1}))).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn node_defaults_and_label_reducer() {
        let settings = Settings::default()
            .with_label_reducer(|_, id, label| label.map(|text| format!("{id}: {text}")));
        let node = resolve_node(&settings, "a", &attrs(json!({"x": 1, "y": 2, "label": 5}))).unwrap();
        assert_eq!(node.kind, "circle");
        assert_eq!(node.label_type, "default");
        assert_eq!(node.color, "#999");
        assert_eq!(node.size, 1.0);
        assert_eq!(node.label.as_deref(), Some("a: 5"));
    }

    #[test]
    fn node_reducer_runs_before_defaults() {
        let settings = Settings::default().with_node_reducer(|_, _, raw| {
            let mut out = raw.clone();
            out.insert("type".to_string(), json!("square"));
            out.insert("y".to_string(), json!(9));
            out
        });
        let node = resolve_node(&settings, "a", &attrs(json!({"x": 1}))).unwrap();
        assert_eq!(node.kind, "square");
        assert_eq!(node.y, 9.0);
    }

    #[test]
    fn rescale_fits_nodes_into_viewport() {
        let mut graph = Graph::new();
        graph.add_node("a", attrs(json!({"x": -1, "y": 0})));
        graph.add_node("b", attrs(json!({"x": 1, "y": 0})));
        let mut settings = Settings::new(100.0, 200.0);
        settings.margin = 10.0;
        let data = reduce_nodes(&graph, &settings).unwrap();
        // ratio = (100 - 20) / 2
        assert_eq!(data["a"].x, 10.0);
        assert_eq!(data["b"].x, 90.0);
        assert_eq!(data["a"].y, 100.0);
    }

    #[test]
    fn rescale_centers_a_single_node() {
        let mut graph = Graph::new();
        graph.add_node("a", attrs(json!({"x": 42, "y": -7, "size": 0})));
        let data = reduce_nodes(&graph, &Settings::new(800.0, 600.0)).unwrap();
        assert_eq!((data["a"].x, data["a"].y), (400.0, 300.0));
    }

    #[test]
    fn reduce_keeps_raw_positions_without_rescale() {
        let mut graph = Graph::new();
        graph.add_node("b", attrs(json!({"x": 3, "y": 4})));
        graph.add_node("a", attrs(json!({"x": 5, "y": 6})));
        let data = reduce_nodes(&graph, &Settings::default().with_rescale(false)).unwrap();
        let ids: Vec<&str> = data.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!((data["b"].x, data["b"].y), (3.0, 4.0));
    }

    #[test]
    fn rescale_weights_barycenter_by_size() {
        let mut graph = Graph::new();
        graph.add_node("a", attrs(json!({"x": 0, "y": 0, "size": 3})));
        graph.add_node("b", attrs(json!({"x": 4, "y": 0, "size": 1})));
        let mut settings = Settings::new(100.0, 100.0);
        settings.margin = 0.0;
        let data = reduce_nodes(&graph, &settings).unwrap();
        // barycenter x = 1, d_max = 3, ratio = 100 / 6
        assert!((data["a"].x - 100.0 / 3.0).abs() < 1e-9);
        assert!((data["b"].x - 100.0).abs() < 1e-9);
        assert_eq!((data["a"].y, data["b"].y), (50.0, 50.0));
    }

    #[test]
    fn rescale_overflow_is_invalid_input() {
        let mut graph = Graph::new();
        // The weighted sum of x positions overflows to infinity.
        graph.add_node("a", attrs(json!({"x": 1.7e308, "y": 0})));
        graph.add_node("b", attrs(json!({"x": 1.7e308, "y": 1})));
        let err = reduce_nodes(&graph, &Settings::new(100.0, 100.0)).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn number_labels_print_in_shortest_form() {
        let settings = Settings::default();
        let node = resolve_node(&settings, "a", &attrs(json!({"x": 0, "y": 0, "label": 2.0}))).unwrap();
        assert_eq!(node.label.as_deref(), Some("2"));
        let node = resolve_node(&settings, "a", &attrs(json!({"x": 0, "y": 0, "label": 0.5}))).unwrap();
        assert_eq!(node.label.as_deref(), Some("0.5"));
    }

    #[test]
    fn zero_label_is_hidden() {
        let settings = Settings::default();
        let node = resolve_node(&settings, "a", &attrs(json!({"x": 0, "y": 0, "label": 0}))).unwrap();
        assert_eq!(node.label, None);
    }
}
