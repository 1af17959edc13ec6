use super::*;
use crate::animation::standard::standard_animation;
use crate::foundation::core::BodyType;

const CATALOG: &str = r#"{
    "items": [
        {
            "group": "weapon",
            "name": "Longsword",
            "variants": ["steel"],
            "animations": ["slash", "walk"],
            "layers": [
                {"zPos": 140, "files": {"male": "weapon/sword/longsword/"}},
                {"zPos": 9, "custom_animation": "slash_oversize", "files": {"male": "weapon/sword/longsword/behind/"}}
            ],
            "credits": {"authors": ["Johannes Sjölund"], "licenses": ["OGA-BY 3.0"], "urls": ["https://opengameart.org/"]}
        },
        {
            "group": "body",
            "name": "Body color",
            "variants": ["light"],
            "animations": ["walk", "slash", "combat", "1h_slash"],
            "layers": [
                {"zPos": 10, "files": {"male": "body/bodies/male/", "female": "body/bodies/female/"}}
            ]
        },
        {
            "group": "hat",
            "name": "Cap",
            "variants": ["red"],
            "animations": ["walk"],
            "layers": [
                {"zPos": 10, "files": {"male": "hat/cap/${head}/"}, "replace": {"head": {"none": "adult"}}}
            ]
        }
    ],
    "custom_animations": {
        "slash_oversize": {
            "frameSize": 192,
            "frames": [["slash-n,0"], ["slash-w,0"], ["slash-s,0"], ["slash-e,0"]],
            "base": "slash"
        }
    }
}"#;

fn selection() -> Selection {
    let mut sel = Selection::new(BodyType::Male);
    sel.select("body", "Body color", "light");
    sel.select("weapon", "Longsword", "steel");
    sel.select("hat", "Cap", "red");
    sel
}

#[test]
fn layers_are_sorted_by_z_with_stable_ties() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let resolved = build_draw_list(&catalog, &selection());
    let files: Vec<&str> = resolved.draw_list.iter().map(|l| l.file_path.as_str()).collect();
    assert_eq!(
        files,
        [
            "weapon/sword/longsword/behind/steel.png",
            "body/bodies/male/light.png",
            "hat/cap/adult/red.png",
            "weapon/sword/longsword/steel.png",
        ]
    );
    // body and hat share zPos 10 and keep catalog order
    assert_eq!(resolved.draw_list.layers()[1].parent_name, "body");
    assert_eq!(resolved.draw_list.layers()[2].parent_name, "hat");
}

#[test]
fn sorting_is_idempotent() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let once = build_draw_list(&catalog, &selection()).draw_list;
    let twice = DrawList::new(once.clone().into_layers());
    assert_eq!(once, twice);
}

#[test]
fn body_type_without_file_skips_layers() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let mut sel = selection();
    sel.body_type = BodyType::Female;
    let resolved = build_draw_list(&catalog, &sel);
    assert_eq!(resolved.draw_list.len(), 1);
    assert_eq!(resolved.draw_list.layers()[0].file_path, "body/bodies/female/light.png");
    assert!(resolved.credits.is_empty());
}

#[test]
fn credits_follow_resolved_files() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let resolved = build_draw_list(&catalog, &selection());
    let names: Vec<&str> = resolved.credits.iter().map(|c| c.file_name.as_str()).collect();
    assert_eq!(
        names,
        ["weapon/sword/longsword/steel.png", "weapon/sword/longsword/behind/steel.png"]
    );
    assert_eq!(resolved.credits[0].licenses, ["OGA-BY 3.0"]);
}

#[test]
fn custom_animation_ids_are_distinct() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let resolved = build_draw_list(&catalog, &selection());
    assert_eq!(resolved.draw_list.custom_animation_ids(), ["slash_oversize"]);
}

#[test]
fn support_goes_through_aliases() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let resolved = build_draw_list(&catalog, &selection());
    let body = &resolved.draw_list.layers()[1];
    assert!(body.supports(standard_animation("combat_idle").unwrap()));
    assert!(body.supports(standard_animation("backslash").unwrap()));
    assert!(!body.supports(standard_animation("halfslash").unwrap()));
    assert!(!body.supports(standard_animation("jump").unwrap()));
}

#[test]
fn unknown_variant_is_ignored() {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let mut sel = Selection::new(BodyType::Male);
    sel.select("body", "Body color", "purple");
    assert!(build_draw_list(&catalog, &sel).draw_list.is_empty());
}

#[test]
fn layer_json_uses_character_file_names() {
    let layer = Layer {
        file_path: "body/bodies/male/light.png".to_string(),
        z_pos: 10,
        custom_animation: None,
        name: "Body color".to_string(),
        parent_name: "body".to_string(),
        variant: "light".to_string(),
        supported_animations: vec!["walk".to_string(), "slash".to_string()],
        uploaded: false,
    };
    let json = serde_json::to_value(&layer).unwrap();
    assert_eq!(json["fileName"], "body/bodies/male/light.png");
    assert_eq!(json["zPos"], 10);
    assert_eq!(json["parentName"], "body");
    assert_eq!(json["supportedAnimations"], "walk,slash");
    assert!(json.get("custom_animation").is_none());
    assert_eq!(layer.element_id(), "body-Body_color_light");
    assert_eq!(layer.export_file_name(), "010 body bodies male light.png");

    let back: Layer = serde_json::from_value(json).unwrap();
    assert_eq!(back, layer);
    let listed: Layer = serde_json::from_str(
        r#"{"fileName": "a/b.png", "zPos": 1, "name": "n", "parentName": "g", "variant": "v", "supportedAnimations": ["walk"]}"#,
    )
    .unwrap();
    assert_eq!(listed.supported_animations, ["walk"]);
}
