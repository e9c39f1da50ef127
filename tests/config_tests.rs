use std::path::PathBuf;
use std::time::Duration;

use hero_slideshow::config::Configuration;

#[test]
fn defaults_match_the_site_scripts() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.slider.dwell, Duration::from_millis(7000));
    assert_eq!(cfg.slider.progress_tick, Duration::from_millis(20));
    assert_eq!(cfg.slider.exit_delay, Duration::from_millis(400));
    assert_eq!(cfg.slider.enter_delay, Duration::from_millis(1000));
    assert!((cfg.slider.swipe_threshold_px - 50.0).abs() < f64::EPSILON);
    assert_eq!(cfg.slider.classes.active, "active");
    assert_eq!(cfg.slider.classes.exiting, "slide-exit");
    assert_eq!(cfg.slider.classes.entering, "slide-enter");
    assert_eq!(cfg.preload.selector, ".image-bg[data-image-src]");
    assert_eq!(cfg.site_root, PathBuf::from("."));
    assert!(cfg.page.is_none());
}

#[test]
fn parse_kebab_case_with_humantime_durations() {
    let yaml = r#"
page: "site/page.yaml"
site-root: "/srv/www"
slider:
  dwell: 5s
  progress-tick: 50ms
  exit-delay: 300ms
  enter-delay: 1s 200ms
  swipe-threshold-px: 80
  selectors:
    root: ".hero-slider"
    dots: ".pager span"
preload:
  max-concurrent-loads: 2
chrome:
  reveal-stagger: 150ms
  parallax-factor: 0.3
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.page, Some(PathBuf::from("site/page.yaml")));
    assert_eq!(cfg.site_root, PathBuf::from("/srv/www"));
    assert_eq!(cfg.slider.dwell, Duration::from_secs(5));
    assert_eq!(cfg.slider.progress_tick, Duration::from_millis(50));
    assert_eq!(cfg.slider.exit_delay, Duration::from_millis(300));
    assert_eq!(cfg.slider.enter_delay, Duration::from_millis(1200));
    assert_eq!(cfg.slider.selectors.root, ".hero-slider");
    assert_eq!(cfg.slider.selectors.dots, ".pager span");
    assert_eq!(cfg.slider.selectors.slides, ".slide-item");
    assert_eq!(cfg.preload.max_concurrent_loads, 2);
    assert_eq!(cfg.chrome.reveal_stagger, Duration::from_millis(150));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = serde_yaml::from_str::<Configuration>("slider:\n  dwel: 5s\n").unwrap_err();
    assert!(err.to_string().contains("dwel"), "{err}");
}

#[test]
fn validation_rejects_bad_timing() {
    let cases = [
        ("slider:\n  dwell: 0s\n", "dwell"),
        ("slider:\n  progress-tick: 0ms\n", "progress-tick"),
        ("slider:\n  dwell: 10ms\n  progress-tick: 20ms\n", "progress-tick"),
        ("slider:\n  swipe-threshold-px: -1\n", "swipe-threshold-px"),
    ];
    for (yaml, needle) in cases {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        let err = cfg.validated().unwrap_err();
        assert!(format!("{err:#}").contains(needle), "{yaml}: {err:#}");
    }
}

#[test]
fn validation_rejects_bad_hooks() {
    let cases = [
        ("slider:\n  classes:\n    active: \"is active\"\n", "classes.active"),
        ("slider:\n  selectors:\n    slides: \"  \"\n", "selectors.slides"),
        ("preload:\n  max-concurrent-loads: 0\n", "max-concurrent-loads"),
        ("preload:\n  attribute: \"\"\n", "preload.attribute"),
    ];
    for (yaml, needle) in cases {
        let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
        let err = cfg.validated().unwrap_err();
        assert!(format!("{err:#}").contains(needle), "{yaml}: {err:#}");
    }
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "slider:\n  dwell: 3s\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.slider.dwell, Duration::from_secs(3));

    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}
