use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub node_color: String,
    pub edge_color: String,
    pub label_color: String,
}

impl Theme {
    /// Palette of the classic graph SVG renderer: grey nodes, light grey edges.
    pub fn graphology() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            node_color: "#999".to_string(),
            edge_color: "#ccc".to_string(),
            label_color: "#000".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            node_color: "#7A8AA6".to_string(),
            edge_color: "#C7D2E5".to_string(),
            label_color: "#1C2430".to_string(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "graphology" | "default" => Some(Self::graphology()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::graphology()
    }
}
