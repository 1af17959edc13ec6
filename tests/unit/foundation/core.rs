use super::*;

#[test]
fn universal_sheet_holds_54_rows_of_13_frames() {
    assert_eq!(UNIVERSAL_SHEET_WIDTH, 13 * UNIVERSAL_FRAME_SIZE);
    assert_eq!(UNIVERSAL_SHEET_HEIGHT, 54 * UNIVERSAL_FRAME_SIZE);
    assert_eq!(Size::universal_sheet(), Size::new(832, 3456));
}

#[test]
fn body_type_parses_and_displays() {
    for b in BodyType::ALL {
        assert_eq!(b.to_string().parse::<BodyType>().unwrap(), b);
    }
    assert!("goblin".parse::<BodyType>().is_err());
}

#[test]
fn body_type_serde_is_lowercase() {
    let s = serde_json::to_string(&BodyType::Muscular).unwrap();
    assert_eq!(s, "\"muscular\"");
    let b: BodyType = serde_json::from_str("\"teen\"").unwrap();
    assert_eq!(b, BodyType::Teen);
}
