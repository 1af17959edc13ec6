use super::*;
use crate::selection::catalog::{ItemDef, LayerDef};
use crate::foundation::core::BodyType;

fn catalog() -> Catalog {
    let item = |group: &str, name: &str| ItemDef {
        group: group.to_string(),
        name: name.to_string(),
        category: None,
        variants: vec!["default".to_string()],
        animations: vec![],
        layers: vec![LayerDef {
            z_pos: Some(1),
            custom_animation: None,
            files: BTreeMap::from([(BodyType::Male, format!("{group}/"))]),
            replace: None,
        }],
        credits: None,
        match_body_color: false,
    };
    Catalog::new(
        vec![item("head", "Human male"), item("head", "Orc")],
        BTreeMap::new(),
    )
    .unwrap()
}

fn table() -> ReplaceSpec {
    ReplaceSpec::Map(BTreeMap::from([(
        "head".to_string(),
        BTreeMap::from([
            ("Human male".to_string(), "human".to_string()),
            ("none".to_string(), "bald".to_string()),
        ]),
    )]))
}

#[test]
fn plain_paths_pass_through() {
    let sel = Selection::new(BodyType::Male);
    assert_eq!(
        resolve_file_template("hair/bob/male/", Some(&table()), &sel, &catalog()),
        "hair/bob/male/"
    );
}

#[test]
fn selected_parent_picks_bucket() {
    let mut sel = Selection::new(BodyType::Male);
    sel.select("head", "Human male", "default");
    assert_eq!(
        resolve_file_template("hat/${head}/", Some(&table()), &sel, &catalog()),
        "hat/human/"
    );
}

#[test]
fn unselected_group_uses_none_bucket() {
    let sel = Selection::new(BodyType::Male);
    assert_eq!(
        resolve_file_template("hat/${head}/", Some(&table()), &sel, &catalog()),
        "hat/bald/"
    );
    // a choice that is not in the catalog counts as no selection
    let mut stale = Selection::new(BodyType::Male);
    stale.select("head", "Human male", "purple");
    assert_eq!(
        resolve_file_template("hat/${head}/", Some(&table()), &stale, &catalog()),
        "hat/bald/"
    );
}

#[test]
fn unresolved_placeholders_render_empty() {
    let mut sel = Selection::new(BodyType::Male);
    sel.select("head", "Orc", "default");
    assert_eq!(
        resolve_file_template("hat/${head}/${sex}x", Some(&table()), &sel, &catalog()),
        "hat//x"
    );
    assert_eq!(
        resolve_file_template("hat/${head}/", None, &sel, &catalog()),
        "hat//"
    );
}

#[test]
fn legacy_single_quoted_table_is_accepted() {
    let raw = ReplaceSpec::Raw("{'head': {'Orc': 'orc'}}".to_string());
    let mut sel = Selection::new(BodyType::Male);
    sel.select("head", "Orc", "default");
    assert_eq!(
        resolve_file_template("hat/${head}/", Some(&raw), &sel, &catalog()),
        "hat/orc/"
    );
}

#[test]
fn malformed_table_strips_placeholders() {
    let raw = ReplaceSpec::Raw("{'head': ".to_string());
    let sel = Selection::new(BodyType::Male);
    assert_eq!(
        resolve_file_template("hat/${head}/cap", Some(&raw), &sel, &catalog()),
        "hat//cap"
    );
}

#[test]
fn unterminated_placeholder_is_literal() {
    assert_eq!(substitute("a/${b", |_| Some("x")), "a/${b");
    assert_eq!(substitute("${a}${b}", |v| (v == "b").then_some("B")), "B");
}
