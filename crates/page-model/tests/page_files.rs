use page_model::{PageDescription, Surface};

#[test]
fn loads_json_description() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.json");
    std::fs::write(
        &path,
        r#"{
  "viewport-height": 720,
  "hero": { "slides": [ { "image": "img/a.jpg" }, { "image": "img/b.jpg" } ] }
}"#,
    )
    .unwrap();

    let desc = PageDescription::from_path(&path).unwrap();
    assert_eq!(desc.viewport_height, 720.0);
    let doc = desc.build();
    let urls: Vec<String> = doc
        .query_all(None, ".image-bg[data-image-src]")
        .iter()
        .filter_map(|el| doc.attribute(el, "data-image-src"))
        .collect();
    assert_eq!(urls, vec!["img/a.jpg".to_string(), "img/b.jpg".to_string()]);
}

#[test]
fn loads_yaml_description() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    std::fs::write(
        &path,
        r#"
reveal:
  - class: feature-card
    top: 1400
"#,
    )
    .unwrap();

    let doc = PageDescription::from_path(&path).unwrap().build();
    assert!(doc.query(None, ".feature-card").is_some());
    assert!(doc.query(None, ".mobile-menu-toggle").is_some());
}

#[test]
fn rejects_unknown_keys() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yml");
    std::fs::write(&path, "carousel: {}\n").unwrap();
    let err = PageDescription::from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("invalid YAML page description"));
}
