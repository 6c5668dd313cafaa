use graph_svg_renderer::config::{Settings, parse_settings};
use graph_svg_renderer::render_json;
use wasm_bindgen::prelude::*;

fn build_settings(settings_json: Option<&str>) -> Result<Settings, String> {
    match settings_json {
        Some(raw) => parse_settings(raw).map_err(|error| format!("{error:#}")),
        None => Ok(Settings::default()),
    }
}

fn render(graph_json: &str, settings_json: Option<&str>) -> Result<String, String> {
    let settings = build_settings(settings_json)?;
    let graph: serde_json::Value =
        serde_json::from_str(graph_json).map_err(|error| error.to_string())?;
    render_json(&graph, &settings).map_err(|error| error.to_string())
}

#[wasm_bindgen]
pub fn render_graph_svg(graph_json: &str, settings_json: Option<String>) -> Result<String, JsValue> {
    render(graph_json, settings_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}
