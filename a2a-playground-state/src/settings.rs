//! User-adjustable preferences

use serde::{Deserialize, Serialize};

use crate::registry::Registry;

pub const DEFAULT_OUTPUT_MIME_TYPES: &[&str] = &["image/*", "text/plain"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsState {
    /// Output modes the user is willing to see, `type/*` and `*/*` allowed
    pub output_mime_types: Vec<String>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            output_mime_types: DEFAULT_OUTPUT_MIME_TYPES
                .iter()
                .map(|mime| (*mime).to_string())
                .collect(),
        }
    }
}

impl SettingsState {
    pub fn with_output_mime_types(mut self, mime_types: Vec<String>) -> Self {
        self.output_mime_types = mime_types;
        self
    }

    /// Whether a part with this MIME type should be shown
    pub fn accepts(&self, mime: &str) -> bool {
        let mime = essence(mime);
        self.output_mime_types
            .iter()
            .any(|pattern| mime_matches(&essence(pattern), &mime))
    }
}

/// Lowercased `type/subtype` without parameters
fn essence(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn mime_matches(pattern: &str, mime: &str) -> bool {
    if pattern == "*" || pattern == "*/*" || pattern == mime {
        return true;
    }
    match (pattern.split_once('/'), mime.split_once('/')) {
        (Some((pattern_type, "*")), Some((mime_type, _))) => pattern_type == mime_type,
        _ => false,
    }
}

impl Registry<SettingsState> {
    pub fn set_output_mime_types(&self, mime_types: Vec<String>) {
        self.update(|settings| settings.clone().with_output_mime_types(mime_types));
    }
}
