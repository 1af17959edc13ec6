use std::collections::BTreeMap;

use crate::foundation::core::BodyType;
use crate::selection::catalog::Catalog;

/// Selected item and variant within one group.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Choice {
    pub name: String,
    pub variant: String,
}

/// Current character: a body type plus at most one item variant per group.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub body_type: BodyType,
    chosen: BTreeMap<String, Choice>,
}

impl Selection {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            chosen: BTreeMap::new(),
        }
    }

    /// Select `name`/`variant` in `group`, replacing any previous choice there.
    pub fn select(
        &mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        variant: impl Into<String>,
    ) {
        self.chosen.insert(
            group.into(),
            Choice {
                name: name.into(),
                variant: variant.into(),
            },
        );
    }

    pub fn clear(&mut self, group: &str) -> Option<Choice> {
        self.chosen.remove(group)
    }

    pub fn choice(&self, group: &str) -> Option<&Choice> {
        self.chosen.get(group)
    }

    pub fn is_selected(&self, group: &str, name: &str, variant: &str) -> bool {
        self.choice(group)
            .is_some_and(|c| c.name == name && c.variant == variant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Choice)> {
        self.chosen.iter().map(|(g, c)| (g.as_str(), c))
    }

    /// Switch every selected body-color-matching item to `variant` where the item offers it.
    ///
    /// Returns the number of groups changed.
    pub fn match_body_color(&mut self, catalog: &Catalog, variant: &str) -> usize {
        let mut changed = 0;
        for (group, choice) in self.chosen.iter_mut() {
            let Some(item) = catalog.item(group, &choice.name) else {
                continue;
            };
            if item.match_body_color && item.has_variant(variant) && choice.variant != variant {
                choice.variant = variant.to_string();
                changed += 1;
            }
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/selection/state.rs"]
mod tests;
