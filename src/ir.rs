use crate::error::{RenderError, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Free-form attribute record attached to nodes and edges.
pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphType {
    Directed,
    Undirected,
    #[default]
    Mixed,
}

impl GraphType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "directed" => Some(Self::Directed),
            "undirected" => Some(Self::Undirected),
            "mixed" => Some(Self::Mixed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Directed => "directed",
            Self::Undirected => "undirected",
            Self::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub attributes: Attributes,
}

/// Attributed graph with insertion-ordered nodes and edges.
///
/// Edges can only be added between nodes that already exist, so every edge
/// endpoint is guaranteed to resolve to a node.
#[derive(Debug, Clone)]
pub struct Graph {
    pub graph_type: GraphType,
    nodes: IndexMap<String, Attributes>,
    edges: IndexMap<String, Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_type(GraphType::Mixed)
    }

    pub fn directed() -> Self {
        Self::with_type(GraphType::Directed)
    }

    pub fn undirected() -> Self {
        Self::with_type(GraphType::Undirected)
    }

    pub fn with_type(graph_type: GraphType) -> Self {
        Self {
            graph_type,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.graph_type == GraphType::Directed
    }

    /// Inserts a node, merging `attributes` into an existing one with the same id.
    pub fn add_node(&mut self, id: &str, attributes: Attributes) {
        let entry = self.nodes.entry(id.to_string()).or_default();
        for (key, value) in attributes {
            entry.insert(key, value);
        }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_attributes(&self, id: &str) -> Option<&Attributes> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.nodes.iter().map(|(id, attrs)| (id.as_str(), attrs))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds an edge with a generated id and returns that id.
    pub fn add_edge(&mut self, source: &str, target: &str, attributes: Attributes) -> Result<String> {
        let mut index = self.edges.len();
        let mut id = format!("e{index}");
        while self.edges.contains_key(&id) {
            index += 1;
            id = format!("e{index}");
        }
        self.add_edge_with_key(&id, source, target, attributes)?;
        Ok(id)
    }

    pub fn add_edge_with_key(
        &mut self,
        id: &str,
        source: &str,
        target: &str,
        attributes: Attributes,
    ) -> Result<()> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(RenderError::MissingEndpoint {
                    edge: id.to_string(),
                    node: endpoint.to_string(),
                });
            }
        }
        if self.edges.contains_key(id) {
            return Err(RenderError::invalid(format!("duplicate edge key {id:?}")));
        }
        self.edges.insert(
            id.to_string(),
            Edge {
                id: id.to_string(),
                source: source.to_string(),
                target: target.to_string(),
                attributes,
            },
        );
        Ok(())
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Visits every edge as `(id, attributes, source, target)` in insertion order.
    pub fn for_each_edge<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Attributes, &str, &str),
    {
        for edge in self.edges.values() {
            f(&edge.id, &edge.attributes, &edge.source, &edge.target);
        }
    }

    /// Builds a graph from its serialized JSON form:
    /// `{ "options": { "type": ... }, "nodes": [{ "key", "attributes" }], "edges": [{ "key", "source", "target", "attributes" }] }`.
    pub fn from_json(value: &Value) -> Result<Self> {
        let serialized = SerializedGraph::deserialize(value)
            .map_err(|err| RenderError::invalid(format!("expecting a serialized graph: {err}")))?;

        let graph_type = match serialized.options.graph_type.as_deref() {
            None => GraphType::Mixed,
            Some(token) => GraphType::from_token(token)
                .ok_or_else(|| RenderError::invalid(format!("unknown graph type {token:?}")))?,
        };

        let mut graph = Graph::with_type(graph_type);
        for node in serialized.nodes {
            graph.add_node(&node.key.into_string(), node.attributes.unwrap_or_default());
        }
        for edge in serialized.edges {
            let source = edge.source.into_string();
            let target = edge.target.into_string();
            if edge.undirected && graph_type == GraphType::Directed {
                return Err(RenderError::invalid(format!(
                    "undirected edge {source:?} -- {target:?} in a directed graph"
                )));
            }
            let attributes = edge.attributes.unwrap_or_default();
            match edge.key {
                Some(key) => graph.add_edge_with_key(&key.into_string(), &source, &target, attributes)?,
                None => {
                    graph.add_edge(&source, &target, attributes)?;
                }
            }
        }
        Ok(graph)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)
            .map_err(|err| RenderError::invalid(format!("graph is not valid JSON: {err}")))?;
        Self::from_json(&value)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct SerializedGraph {
    #[serde(default)]
    options: SerializedOptions,
    nodes: Vec<SerializedNode>,
    #[serde(default)]
    edges: Vec<SerializedEdge>,
}

#[derive(Debug, Default, Deserialize)]
struct SerializedOptions {
    #[serde(rename = "type")]
    graph_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerializedNode {
    key: Key,
    attributes: Option<Attributes>,
}

#[derive(Debug, Deserialize)]
struct SerializedEdge {
    key: Option<Key>,
    source: Key,
    target: Key,
    attributes: Option<Attributes>,
    #[serde(default)]
    undirected: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Key {
    String(String),
    Number(serde_json::Number),
}

impl Key {
    fn into_string(self) -> String {
        match self {
            Key::String(value) => value,
            Key::Number(value) => value.to_string(),
        }
    }
}
