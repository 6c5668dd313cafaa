pub mod arrow;
#[cfg(feature = "cli")]
pub mod cli;
pub mod components;
pub mod config;
pub mod error;
pub mod ir;
pub mod reduce;
pub mod render;
pub mod svg;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use components::{ShapeCategory, ShapeRegistry};
pub use config::Settings;
pub use error::{RenderError, Result};
pub use ir::{Attributes, Graph, GraphType};
pub use render::{Renderer, render_json, render_svg};
pub use theme::Theme;
