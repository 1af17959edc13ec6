//! `character.json`: the portable description of a composed character.

use chrono::{DateTime, Local};

use crate::foundation::core::BodyType;
use crate::foundation::error::CharsheetResult;
use crate::selection::catalog::Catalog;
use crate::selection::draw_list::{Credit, Layer, ResolvedSelection};
use crate::selection::state::Selection;

pub const CHARACTER_FORMAT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDoc {
    pub body_type_name: BodyType,
    #[serde(default)]
    pub url: String,
    /// Base URL the sheet paths are relative to.
    #[serde(default)]
    pub spritesheets: String,
    pub version: u32,
    #[serde(default)]
    pub datetime: String,
    #[serde(default)]
    pub credits: Vec<Credit>,
    pub layers: Vec<Layer>,
}

impl CharacterDoc {
    pub fn new(
        body_type: BodyType,
        resolved: &ResolvedSelection,
        url: impl Into<String>,
        spritesheets: impl Into<String>,
        datetime: DateTime<Local>,
    ) -> Self {
        Self {
            body_type_name: body_type,
            url: url.into(),
            spritesheets: spritesheets.into(),
            version: CHARACTER_FORMAT_VERSION,
            datetime: datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            credits: resolved.credits.clone(),
            layers: resolved
                .draw_list
                .iter()
                .filter(|l| !l.uploaded)
                .cloned()
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> CharsheetResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> CharsheetResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Rebuild a selection from exported layers by their element ids.
///
/// Layers that no longer match a catalog item are logged and ignored.
pub fn import_selection(catalog: &Catalog, doc: &CharacterDoc) -> Selection {
    let mut selection = Selection::new(doc.body_type_name);
    for layer in &doc.layers {
        let id = layer.element_id();
        match catalog.find_element(&id) {
            Some((item, variant)) => selection.select(&item.group, &item.name, variant),
            None => tracing::warn!(element = %id, "imported layer not in catalog"),
        }
    }
    selection
}

#[cfg(test)]
#[path = "../../tests/unit/export/character.rs"]
mod tests;
