//! `${variable}` substitution in layer file paths.
//!
//! A variable names a selection group. Its value is looked up in the layer's replace table under
//! the name of the item currently selected in that group, or under `none` when nothing valid is
//! selected there.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::selection::catalog::{Catalog, ReplaceSpec};
use crate::selection::state::Selection;

type ReplaceTable = BTreeMap<String, BTreeMap<String, String>>;

const NO_PARENT: &str = "none";

/// Resolve every `${var}` in `template`. Unresolvable placeholders become empty.
pub fn resolve_file_template(
    template: &str,
    replace: Option<&ReplaceSpec>,
    selection: &Selection,
    catalog: &Catalog,
) -> String {
    if !template.contains("${") {
        return template.to_string();
    }
    let table = replace.and_then(|r| parse_replace(r, template));
    let values: BTreeMap<&str, &str> = table
        .as_deref()
        .map(|table| {
            table
                .iter()
                .filter_map(|(var, buckets)| {
                    let bucket = parent_bucket(var, selection, catalog);
                    buckets.get(bucket).map(|v| (var.as_str(), v.as_str()))
                })
                .collect()
        })
        .unwrap_or_default();
    substitute(template, |var| values.get(var).copied())
}

fn parse_replace<'a>(replace: &'a ReplaceSpec, template: &str) -> Option<Cow<'a, ReplaceTable>> {
    match replace {
        ReplaceSpec::Map(map) => Some(Cow::Borrowed(map)),
        ReplaceSpec::Raw(raw) => match serde_json::from_str::<ReplaceTable>(&raw.replace('\'', "\"")) {
            Ok(map) => Some(Cow::Owned(map)),
            Err(err) => {
                tracing::error!(template, replace = %raw, error = %err, "malformed replace table");
                None
            }
        },
    }
}

fn parent_bucket<'a>(group: &str, selection: &'a Selection, catalog: &Catalog) -> &'a str {
    selection
        .choice(group)
        .filter(|c| {
            catalog
                .item(group, &c.name)
                .is_some_and(|item| item.has_variant(&c.variant))
        })
        .map_or(NO_PARENT, |c| c.name.as_str())
}

/// Replace `${name}` occurrences using `lookup`; an unterminated `${` is kept literally.
pub fn substitute<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + len];
        out.push_str(lookup(var).unwrap_or(""));
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/selection/template.rs"]
mod tests;
