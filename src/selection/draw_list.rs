use crate::animation::layout::distinct_custom_animations;
use crate::animation::standard::AnimationDescriptor;
use crate::selection::catalog::{Catalog, CreditDef, element_id};
use crate::selection::state::Selection;
use crate::selection::template::resolve_file_template;

pub const UPLOADED_LAYER_NAME: &str = "uploaded";

/// One image layer to draw, resolved for the current body type.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    #[serde(rename = "fileName")]
    pub file_path: String,
    #[serde(rename = "zPos")]
    pub z_pos: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_animation: Option<String>,
    pub name: String,
    /// Selection group of the owning item.
    #[serde(rename = "parentName")]
    pub parent_name: String,
    pub variant: String,
    #[serde(rename = "supportedAnimations", default, with = "comma_list")]
    pub supported_animations: Vec<String>,
    /// A user-supplied full sheet, drawn as one image at the origin.
    #[serde(skip)]
    pub uploaded: bool,
}

impl Layer {
    /// Layer for an uploaded sheet cached under `path`.
    pub fn uploaded(path: impl Into<String>, z_pos: i32) -> Self {
        Self {
            file_path: path.into(),
            z_pos,
            custom_animation: None,
            name: UPLOADED_LAYER_NAME.to_string(),
            parent_name: UPLOADED_LAYER_NAME.to_string(),
            variant: String::new(),
            supported_animations: Vec::new(),
            uploaded: true,
        }
    }

    pub fn element_id(&self) -> String {
        element_id(&self.parent_name, &self.name, &self.variant)
    }

    pub fn supports(&self, animation: &AnimationDescriptor) -> bool {
        animation.is_supported_by(&self.supported_animations)
    }

    /// File name used for per-item export entries: `"<zPos:03> <path with '/' as ' '>"`.
    pub fn export_file_name(&self) -> String {
        format!("{:03} {}", self.z_pos, self.file_path.replace('/', " "))
    }
}

/// Attribution for one drawn file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Credit {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(default, with = "comma_list")]
    pub licenses: Vec<String>,
    #[serde(default, with = "comma_list")]
    pub authors: Vec<String>,
    #[serde(default, with = "comma_list")]
    pub urls: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl Credit {
    fn from_def(file_name: &str, def: &CreditDef) -> Self {
        Self {
            file_name: file_name.to_string(),
            licenses: def.licenses.clone(),
            authors: def.authors.clone(),
            urls: def.urls.clone(),
            notes: def.notes.clone(),
        }
    }
}

/// Layers in ascending z-order. Equal z-positions keep discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DrawList {
    layers: Vec<Layer>,
}

impl DrawList {
    pub fn new(mut layers: Vec<Layer>) -> Self {
        layers.sort_by_key(|l| l.z_pos);
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Distinct custom animations referenced by the list, first-seen order.
    pub fn custom_animation_ids(&self) -> Vec<String> {
        distinct_custom_animations(self.layers.iter().map(|l| l.custom_animation.as_deref()))
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

/// Draw list and credits produced from one selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedSelection {
    pub draw_list: DrawList,
    pub credits: Vec<Credit>,
}

/// Translate `selection` into ordered layers for its body type.
///
/// Items are visited in catalog order. A layer without a file for the body type is skipped, as
/// is a layer without a z-position (reported, never defaulted).
pub fn build_draw_list(catalog: &Catalog, selection: &Selection) -> ResolvedSelection {
    let mut layers = Vec::new();
    let mut credits = Vec::new();

    for item in catalog.items() {
        let Some(choice) = selection.choice(&item.group) else {
            continue;
        };
        if choice.name != item.name {
            continue;
        }
        if !item.has_variant(&choice.variant) {
            tracing::warn!(
                group = %item.group,
                item = %item.name,
                variant = %choice.variant,
                "selected variant not in catalog"
            );
            continue;
        }

        for (idx, def) in item.layers.iter().enumerate() {
            let Some(prefix) = def.files.get(&selection.body_type) else {
                continue;
            };
            let Some(z_pos) = def.z_pos else {
                tracing::error!(
                    item = %item.element_id(&choice.variant),
                    layer = idx + 1,
                    "layer has no zPos, skipped"
                );
                continue;
            };
            let template = format!("{prefix}{}.png", choice.variant);
            let file_path =
                resolve_file_template(&template, def.replace.as_ref(), selection, catalog);

            if let Some(credit) = &item.credits {
                credits.push(Credit::from_def(&file_path, credit));
            }
            layers.push(Layer {
                file_path,
                z_pos,
                custom_animation: def.custom_animation.clone(),
                name: item.name.clone(),
                parent_name: item.group.clone(),
                variant: choice.variant.clone(),
                supported_animations: item.animations.clone(),
                uploaded: false,
            });
        }
    }

    ResolvedSelection {
        draw_list: DrawList::new(layers),
        credits,
    }
}

/// Lists written as comma-separated strings; a JSON array is accepted on input too.
mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Joined(String),
        List(Vec<String>),
    }

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Joined(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Repr::List(v) => v,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/draw_list.rs"]
mod tests;
