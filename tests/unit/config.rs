use super::*;

#[test]
fn partial_json_fills_defaults() {
    let cfg = ConvertConfig::from_reader(r#"{ "merge_skeletons": true, "image_dir": "art/" }"#.as_bytes())
        .unwrap();
    assert!(cfg.merge_skeletons);
    assert_eq!(cfg.max_depth, 32);
    assert_eq!(cfg.image_path("hand"), "art/hand.png");
}

#[test]
fn empty_image_dir_yields_bare_file_names() {
    let cfg = ConvertConfig {
        image_dir: String::new(),
        image_extension: "webp".into(),
        ..ConvertConfig::default()
    };
    assert_eq!(cfg.image_path("x"), "x.webp");
}

#[test]
fn invalid_values_are_rejected() {
    assert!(ConvertConfig::from_reader(r#"{ "flatten_tolerance": 0 }"#.as_bytes()).is_err());
    assert!(ConvertConfig::from_reader(r#"{ "max_depth": 0 }"#.as_bytes()).is_err());
    assert!(ConvertConfig::from_reader(r#"{ "root_bone": " " }"#.as_bytes()).is_err());
    assert!(ConvertConfig::from_reader("not json".as_bytes()).is_err());
}

#[test]
fn defaults_validate() {
    ConvertConfig::default().validate().unwrap();
}
