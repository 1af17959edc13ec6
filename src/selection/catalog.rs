use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::Context;

use crate::animation::custom::{AnimationRegistry, CustomAnimation};
use crate::foundation::core::BodyType;
use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Filename substitution table for a layer: `{variable: {parentBucket: value}}`.
///
/// Accepted either as a JSON object or as the legacy single-quoted string form, which is only
/// parsed (and, if malformed, reported) when the layer is resolved.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ReplaceSpec {
    Map(BTreeMap<String, BTreeMap<String, String>>),
    Raw(String),
}

/// One drawable layer of a catalog item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Required; `None` only survives deserialization so validation can name the item.
    #[serde(rename = "zPos", default)]
    pub z_pos: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_animation: Option<String>,
    /// Sheet path prefix per body type; the variant name and `.png` are appended.
    pub files: BTreeMap<BodyType, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<ReplaceSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreditDef {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub licenses: Vec<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// A selectable item: one radio group entry with its variants.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemDef {
    /// Selection group; at most one item per group is selected.
    pub group: String,
    pub name: String,
    /// Top-level category used to organize category exports.
    #[serde(default)]
    pub category: Option<String>,
    pub variants: Vec<String>,
    /// Supported animation keys (`walk`, `combat`, `1h_slash`, ...).
    #[serde(default)]
    pub animations: Vec<String>,
    pub layers: Vec<LayerDef>,
    #[serde(default)]
    pub credits: Option<CreditDef>,
    /// Follows the body color when the body variant changes.
    #[serde(default, rename = "matchBodyColor")]
    pub match_body_color: bool,
}

impl ItemDef {
    pub fn element_id(&self, variant: &str) -> String {
        element_id(&self.group, &self.name, variant)
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        self.variants.iter().any(|v| v == variant)
    }

    pub fn category_name(&self) -> &str {
        self.category.as_deref().unwrap_or("Uncategorized")
    }
}

/// Identifier of one item variant: `group-name_variant`, spaces replaced by underscores.
pub fn element_id(group: &str, name: &str, variant: &str) -> String {
    format!(
        "{group}-{}_{}",
        name.replace(' ', "_"),
        variant.replace(' ', "_")
    )
}

#[derive(serde::Deserialize)]
struct CatalogDoc {
    items: Vec<ItemDef>,
    #[serde(default)]
    custom_animations: BTreeMap<String, CustomAnimation>,
}

/// Item metadata plus custom-animation geometry; validated on load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<ItemDef>,
    registry: AnimationRegistry,
}

impl Catalog {
    pub fn new(
        items: Vec<ItemDef>,
        custom_animations: BTreeMap<String, CustomAnimation>,
    ) -> CharsheetResult<Self> {
        let catalog = Self {
            items,
            registry: AnimationRegistry::new(custom_animations),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> CharsheetResult<Self> {
        let doc: CatalogDoc = serde_json::from_str(json)?;
        Self::new(doc.items, doc.custom_animations)
    }

    pub fn from_json_file(path: &Path) -> CharsheetResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    pub fn registry(&self) -> &AnimationRegistry {
        &self.registry
    }

    pub fn item(&self, group: &str, name: &str) -> Option<&ItemDef> {
        self.items
            .iter()
            .find(|i| i.group == group && i.name == name)
    }

    /// Resolve an element id back to its item and variant.
    pub fn find_element(&self, id: &str) -> Option<(&ItemDef, &str)> {
        self.items.iter().find_map(|item| {
            item.variants
                .iter()
                .find(|v| item.element_id(v) == id)
                .map(|v| (item, v.as_str()))
        })
    }

    pub fn items_in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a ItemDef> + 'a {
        self.items.iter().filter(move |i| i.group == group)
    }

    pub fn validate(&self) -> CharsheetResult<()> {
        self.registry.validate()?;

        let mut ids = HashSet::new();
        for item in &self.items {
            let label = format!("{}/{}", item.group, item.name);
            if item.group.is_empty() || item.name.is_empty() {
                return Err(CharsheetError::validation(
                    "catalog items need a group and a name",
                ));
            }
            if item.variants.is_empty() {
                return Err(CharsheetError::validation(format!(
                    "item '{label}' has no variants"
                )));
            }
            if item.layers.is_empty() {
                return Err(CharsheetError::validation(format!(
                    "item '{label}' has no layers"
                )));
            }
            for variant in &item.variants {
                if !ids.insert(item.element_id(variant)) {
                    return Err(CharsheetError::validation(format!(
                        "duplicate element id '{}'",
                        item.element_id(variant)
                    )));
                }
            }
            for (idx, layer) in item.layers.iter().enumerate() {
                let n = idx + 1;
                if layer.z_pos.is_none() {
                    return Err(CharsheetError::validation(format!(
                        "item '{label}' layer {n} has no zPos"
                    )));
                }
                if let Some((body, _)) = layer.files.iter().find(|(_, p)| p.is_empty()) {
                    return Err(CharsheetError::validation(format!(
                        "item '{label}' layer {n} has an empty path for body type '{body}'"
                    )));
                }
                if let Some(custom) = &layer.custom_animation {
                    self.registry.require_custom(custom).map_err(|_| {
                        CharsheetError::validation(format!(
                            "item '{label}' layer {n} uses unknown custom animation '{custom}'"
                        ))
                    })?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/catalog.rs"]
mod tests;
