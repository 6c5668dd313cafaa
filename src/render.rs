use crate::arrow::arrow_polygon;
use crate::components::ShapeRegistry;
use crate::config::Settings;
use crate::error::{RenderError, Result};
use crate::ir::Graph;
use crate::reduce::{NodeData, RenderNode, reduce_nodes, resolve_edge};
use crate::svg::fmt_num;
use anyhow::Context;
use log::{debug, trace};
use serde_json::Value;
use std::path::Path;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>";
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Renders `graph` with the built-in components.
pub fn render_svg(graph: &Graph, settings: &Settings) -> Result<String> {
    Renderer::new(ShapeRegistry::builtin()).render(graph, settings)
}

/// Renders a serialized graph, rejecting values that do not describe one.
pub fn render_json(graph: &Value, settings: &Settings) -> Result<String> {
    let graph = Graph::from_json(graph)?;
    render_svg(&graph, settings)
}

/// Assembles the SVG document for a graph using the components of a registry.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    registry: &'a ShapeRegistry,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a ShapeRegistry) -> Self {
        Self { registry }
    }

    pub fn render(&self, graph: &Graph, settings: &Settings) -> Result<String> {
        debug!(
            graph_type = graph.graph_type.as_str(),
            nodes = graph.node_count(),
            edges = graph.edge_count();
            "Rendering graph"
        );
        let node_data = reduce_nodes(graph, settings)?;

        let mut document = SvgDocument::new(settings.width, settings.height);
        self.draw_edges(graph, settings, &node_data, &mut document.edges)?;
        for node in node_data.values() {
            let shape = self.registry.node_shape(&node.kind)?;
            document.nodes.push(shape.render(settings, node));
            let label = self.registry.label_style(&node.label_type)?;
            document.labels.push(label.render(settings, node));
        }

        let svg = document.finish();
        debug!(bytes = svg.len(); "SVG rendered");
        Ok(svg)
    }

    fn draw_edges(
        &self,
        graph: &Graph,
        settings: &Settings,
        node_data: &NodeData,
        out: &mut Vec<String>,
    ) -> Result<()> {
        let directed = graph.is_directed();
        for edge in graph.edges() {
            let attrs = resolve_edge(settings, &edge.id, &edge.attributes);
            let style = self.registry.edge_style(&attrs.kind)?;
            let source = lookup(node_data, &edge.id, &edge.source)?;
            let target = lookup(node_data, &edge.id, &edge.target)?;

            if directed {
                match arrow_polygon(source, target) {
                    Some(arrow) => out.push(arrow.to_svg(&attrs.color)),
                    None => trace!(edge = edge.id.as_str(); "Skipping arrow of zero-length edge"),
                }
            }
            out.push(style.render(settings, &attrs, source, target));
        }
        Ok(())
    }
}

fn lookup<'n>(node_data: &'n NodeData, edge: &str, node: &str) -> Result<&'n RenderNode> {
    node_data.get(node).ok_or_else(|| RenderError::MissingEndpoint {
        edge: edge.to_string(),
        node: node.to_string(),
    })
}

/// Three ordered layers of fragments, joined once into the final document.
struct SvgDocument {
    width: f64,
    height: f64,
    edges: Vec<String>,
    nodes: Vec<String>,
    labels: Vec<String>,
}

impl SvgDocument {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            edges: Vec::new(),
            nodes: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn finish(self) -> String {
        let width = fmt_num(self.width);
        let height = fmt_num(self.height);
        let header = format!(
            "{XML_DECLARATION}<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" version=\"1.1\" xmlns=\"{SVG_NAMESPACE}\">"
        );
        let layers = [&self.edges, &self.nodes, &self.labels];
        let body_len: usize = layers
            .iter()
            .flat_map(|layer| layer.iter())
            .map(String::len)
            .sum();

        let mut svg = String::with_capacity(header.len() + body_len + 32);
        svg.push_str(&header);
        for layer in layers {
            svg.push_str("<g>");
            for fragment in layer {
                svg.push_str(fragment);
            }
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");
        svg
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, settings: &Settings) -> anyhow::Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(settings.width as f32, settings.height as f32)
        .ok_or_else(|| anyhow::anyhow!("invalid document size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Attributes;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    fn two_node_graph(mut graph: Graph) -> Graph {
        graph.add_node("a", attrs(json!({"x": 0, "y": 0, "size": 0})));
        graph.add_node("b", attrs(json!({"x": 10, "y": 0, "size": 2, "label": "B"})));
        graph.add_edge("a", "b", Attributes::new()).unwrap();
        graph
    }

    fn settings() -> Settings {
        Settings::new(800.0, 600.0).with_rescale(false)
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(&two_node_graph(Graph::directed()), &settings()).unwrap();
        assert_eq!(
            svg,
            concat!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>",
                "<svg width=\"800\" height=\"600\" viewBox=\"0 0 800 600\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\">",
                "<g>",
                "<polygon points=\"8,0 6,-1 6,1\" fill=\"#ccc\" />",
                "<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"0\" stroke=\"#ccc\" stroke-width=\"1\" />",
                "</g>",
                "<g>",
                "<circle cx=\"0\" cy=\"0\" r=\"0\" fill=\"#999\" />",
                "<circle cx=\"10\" cy=\"0\" r=\"2\" fill=\"#999\" />",
                "</g>",
                "<g>",
                "<text x=\"12.2\" y=\"4\" font-family=\"sans-serif\" font-size=\"12\" fill=\"#000\">B</text>",
                "</g>",
                "</svg>"
            )
        );
    }

    #[test]
    fn undirected_graph_has_no_arrows() {
        let svg = render_svg(&two_node_graph(Graph::undirected()), &settings()).unwrap();
        assert!(!svg.contains("<polygon"));
        let svg = render_svg(&two_node_graph(Graph::new()), &settings()).unwrap();
        assert!(!svg.contains("<polygon"));
    }

    #[test]
    fn unknown_edge_type_fails_the_render() {
        let mut graph = two_node_graph(Graph::directed());
        graph
            .add_edge("b", "a", attrs(json!({"type": "curve"})))
            .unwrap();
        let err = render_svg(&graph, &settings()).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnsupportedType { category: crate::components::ShapeCategory::Edge, ref key } if key == "curve"
        ));
    }

    #[test]
    fn custom_registry_components_are_used() {
        let mut registry = ShapeRegistry::with_builtins();
        registry.register_node_shape("circle", |_: &Settings, node: &RenderNode| {
            format!("<use href=\"#n\" data-id=\"{}\" />", node.id)
        });
        let svg = Renderer::new(&registry)
            .render(&two_node_graph(Graph::undirected()), &settings())
            .unwrap();
        assert!(svg.contains("<g><use href=\"#n\" data-id=\"a\" /><use href=\"#n\" data-id=\"b\" /></g>"));
    }

    #[test]
    fn render_json_validates_input() {
        let err = render_json(&json!("not a graph"), &settings()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }
}
