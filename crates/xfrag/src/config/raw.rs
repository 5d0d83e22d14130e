//! Loosely typed configuration shapes as they appear in JSON.

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawTokenDefinition {
    pub affects_injection: bool,
    pub injection_path_template: Option<RawInjectionPathTemplate>,
    pub attribute_match_order_for_injection: Vec<String>,
    pub token_read_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInjectionPathTemplate {
    pub base_path: String,
    pub template_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGroup {
    pub group_selector: String,
    pub group_display_attribute: String,
    pub group_path_token: String,
    #[serde(default)]
    pub paths: Map<String, Value>,
}
