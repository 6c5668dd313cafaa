use crate::ir::Attributes;
use crate::theme::Theme;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

pub const DEFAULT_WIDTH: f64 = 2048.0;
pub const DEFAULT_HEIGHT: f64 = 2048.0;
pub const DEFAULT_MARGIN: f64 = 20.0;

/// User transform applied to a raw node or edge attribute record before defaults
/// are filled in. Receives the settings, the element id and the raw attributes.
pub type AttributeReducer = Arc<dyn Fn(&Settings, &str, &Attributes) -> Attributes + Send + Sync>;

/// User transform applied to a node label. Returning `None` hides the label.
pub type LabelReducer =
    Arc<dyn Fn(&Settings, &str, Option<String>) -> Option<String> + Send + Sync>;

#[derive(Clone)]
pub struct NodeSettings {
    pub reducer: Option<AttributeReducer>,
    pub default_color: String,
    pub default_size: f64,
    pub default_type: String,
}

#[derive(Clone)]
pub struct EdgeSettings {
    pub reducer: Option<AttributeReducer>,
    pub default_color: String,
    pub default_size: f64,
    pub default_type: String,
}

#[derive(Clone)]
pub struct NodeLabelSettings {
    pub reducer: Option<LabelReducer>,
    pub default_type: String,
    pub font_family: String,
    pub font_size: f64,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    /// Fit node positions into the viewport before drawing.
    pub rescale: bool,
    pub nodes: NodeSettings,
    pub edges: EdgeSettings,
    pub node_labels: NodeLabelSettings,
}

impl Settings {
    /// Dimensions are taken as given; only [`parse_settings`] and the CLI
    /// check them with [`validate_dimensions`].
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            margin: DEFAULT_MARGIN,
            rescale: true,
            nodes: NodeSettings {
                reducer: None,
                default_color: theme.node_color.clone(),
                default_size: 1.0,
                default_type: "circle".to_string(),
            },
            edges: EdgeSettings {
                reducer: None,
                default_color: theme.edge_color.clone(),
                default_size: 1.0,
                default_type: "line".to_string(),
            },
            node_labels: NodeLabelSettings {
                reducer: None,
                default_type: "default".to_string(),
                font_family: theme.font_family.clone(),
                font_size: theme.font_size,
                color: theme.label_color.clone(),
            },
        }
    }

    pub fn with_rescale(mut self, rescale: bool) -> Self {
        self.rescale = rescale;
        self
    }

    pub fn with_node_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&Settings, &str, &Attributes) -> Attributes + Send + Sync + 'static,
    {
        self.nodes.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn with_edge_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&Settings, &str, &Attributes) -> Attributes + Send + Sync + 'static,
    {
        self.edges.reducer = Some(Arc::new(reducer));
        self
    }

    pub fn with_label_reducer<F>(mut self, reducer: F) -> Self
    where
        F: Fn(&Settings, &str, Option<String>) -> Option<String> + Send + Sync + 'static,
    {
        self.node_labels.reducer = Some(Arc::new(reducer));
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}

fn reducer_marker<T>(reducer: &Option<T>) -> &'static str {
    if reducer.is_some() { "Some(<fn>)" } else { "None" }
}

impl fmt::Debug for NodeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSettings")
            .field("reducer", &format_args!("{}", reducer_marker(&self.reducer)))
            .field("default_color", &self.default_color)
            .field("default_size", &self.default_size)
            .field("default_type", &self.default_type)
            .finish()
    }
}

impl fmt::Debug for EdgeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeSettings")
            .field("reducer", &format_args!("{}", reducer_marker(&self.reducer)))
            .field("default_color", &self.default_color)
            .field("default_size", &self.default_size)
            .field("default_type", &self.default_type)
            .finish()
    }
}

impl fmt::Debug for NodeLabelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeLabelSettings")
            .field("reducer", &format_args!("{}", reducer_marker(&self.reducer)))
            .field("default_type", &self.default_type)
            .field("font_family", &self.font_family)
            .field("font_size", &self.font_size)
            .field("color", &self.color)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    theme: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<f64>,
    rescale: Option<bool>,
    nodes: Option<NodeSettingsFile>,
    edges: Option<EdgeSettingsFile>,
    node_labels: Option<NodeLabelSettingsFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NodeSettingsFile {
    default_color: Option<String>,
    default_size: Option<f64>,
    default_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EdgeSettingsFile {
    default_color: Option<String>,
    default_size: Option<f64>,
    default_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct NodeLabelSettingsFile {
    default_type: Option<String>,
    font_family: Option<String>,
    font_size: Option<f64>,
    color: Option<String>,
}

pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_settings(&contents)
}

/// Parses a settings document (JSON, or JSON5 with comments and trailing commas)
/// over the defaults of the selected theme.
pub fn parse_settings(contents: &str) -> anyhow::Result<Settings> {
    let parsed: SettingsFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut settings = match parsed.theme.as_deref() {
        None => Settings::default(),
        Some(name) => match Theme::from_name(name) {
            Some(theme) => Settings::from_theme(&theme),
            None => anyhow::bail!("unknown theme: {name}"),
        },
    };

    if let Some(v) = parsed.width {
        settings.width = v;
    }
    if let Some(v) = parsed.height {
        settings.height = v;
    }
    if let Some(v) = parsed.margin {
        settings.margin = v;
    }
    if let Some(v) = parsed.rescale {
        settings.rescale = v;
    }

    if let Some(nodes) = parsed.nodes {
        if let Some(v) = nodes.default_color {
            settings.nodes.default_color = v;
        }
        if let Some(v) = nodes.default_size {
            settings.nodes.default_size = v;
        }
        if let Some(v) = nodes.default_type {
            settings.nodes.default_type = v;
        }
    }

    if let Some(edges) = parsed.edges {
        if let Some(v) = edges.default_color {
            settings.edges.default_color = v;
        }
        if let Some(v) = edges.default_size {
            settings.edges.default_size = v;
        }
        if let Some(v) = edges.default_type {
            settings.edges.default_type = v;
        }
    }

    if let Some(labels) = parsed.node_labels {
        if let Some(v) = labels.default_type {
            settings.node_labels.default_type = v;
        }
        if let Some(v) = labels.font_family {
            settings.node_labels.font_family = v;
        }
        if let Some(v) = labels.font_size {
            settings.node_labels.font_size = v;
        }
        if let Some(v) = labels.color {
            settings.node_labels.color = v;
        }
    }

    validate_dimensions(&settings)?;
    Ok(settings)
}

pub fn validate_dimensions(settings: &Settings) -> anyhow::Result<()> {
    for (name, value) in [("width", settings.width), ("height", settings.height)] {
        if !value.is_finite() || value <= 0.0 {
            anyhow::bail!("{name} must be a positive number, got {value}");
        }
    }
    if !settings.margin.is_finite() || settings.margin < 0.0 {
        anyhow::bail!("margin must be a non-negative number, got {}", settings.margin);
    }
    Ok(())
}
