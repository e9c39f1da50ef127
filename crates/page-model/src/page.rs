use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::document::{Document, ElementId};
use crate::surface::{Rect, Surface};

const PAGE_WIDTH: f64 = 1280.0;

/// Declarative description of the landing page markup the scripts bind to.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PageDescription {
    pub viewport_height: f64,
    pub header: Option<HeaderDescription>,
    pub hero: Option<HeroDescription>,
    /// Named sections stacked below the hero, targets of in-page links.
    pub sections: Vec<SectionDescription>,
    /// Content blocks that fade in as they scroll into view.
    pub reveal: Vec<RevealDescription>,
}

impl Default for PageDescription {
    fn default() -> Self {
        Self {
            viewport_height: 900.0,
            header: Some(HeaderDescription::default()),
            hero: Some(HeroDescription::default()),
            sections: vec![SectionDescription {
                id: "featured".into(),
                height: SectionDescription::default_height(),
            }],
            reveal: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HeaderDescription {
    pub height: f64,
    pub menu_links: usize,
    pub menu_toggle: bool,
    pub menu_close: bool,
}

impl Default for HeaderDescription {
    fn default() -> Self {
        Self {
            height: 80.0,
            menu_links: 4,
            menu_toggle: true,
            menu_close: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct HeroDescription {
    pub height: f64,
    pub slides: Vec<SlideDescription>,
    pub dots: bool,
    pub counter: bool,
    pub progress: bool,
    /// Button that scrolls to the first section.
    pub scroll_down: bool,
}

impl Default for HeroDescription {
    fn default() -> Self {
        Self {
            height: 900.0,
            slides: Vec::new(),
            dots: true,
            counter: true,
            progress: true,
            scroll_down: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SlideDescription {
    /// Background image URL, exposed as `data-image-src`.
    pub image: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SectionDescription {
    pub id: String,
    #[serde(default = "SectionDescription::default_height")]
    pub height: f64,
}

impl SectionDescription {
    const fn default_height() -> f64 {
        600.0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RevealDescription {
    pub class: String,
    pub top: f64,
    #[serde(default = "RevealDescription::default_height")]
    pub height: f64,
}

impl RevealDescription {
    const fn default_height() -> f64 {
        300.0
    }
}

impl PageDescription {
    /// Loads a description from YAML, or JSON when the extension is `.json`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read page description {}", path.display()))?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid JSON page description {}", path.display()))
        } else {
            serde_yaml::from_str(&raw)
                .with_context(|| format!("invalid YAML page description {}", path.display()))
        }
    }

    /// Builds the element tree with the class hooks the site scripts expect.
    pub fn build(&self) -> Document {
        let mut doc = Document::new(self.viewport_height);
        let root = doc.root();
        let mut cursor = 0.0;

        if let Some(header) = &self.header {
            let el = doc.append(root, "header", &["header"]);
            doc.set_rect(el, Rect::new(0.0, 0.0, PAGE_WIDTH, header.height));
            build_header(&mut doc, el, header);
            cursor += header.height;
        }

        if let Some(hero) = &self.hero {
            let section = doc.append(root, "section", &["hero"]);
            doc.set_attribute(section, "id", "hero");
            doc.set_rect(section, Rect::new(cursor, 0.0, PAGE_WIDTH, hero.height));
            build_slider(&mut doc, section, hero);
            if hero.scroll_down {
                doc.append(section, "button", &["scroll-down"]);
            }
            cursor += hero.height;
        }

        for desc in &self.sections {
            let el = doc.append(root, "section", &[]);
            doc.set_attribute(el, "id", &desc.id);
            doc.set_rect(el, Rect::new(cursor, 0.0, PAGE_WIDTH, desc.height));
            cursor += desc.height;
        }

        for block in &self.reveal {
            let el = doc.append(root, "div", &[block.class.as_str()]);
            doc.set_rect(el, Rect::new(block.top.max(cursor), 0.0, PAGE_WIDTH, block.height));
        }

        doc
    }
}

fn build_header(doc: &mut Document, header: ElementId, desc: &HeaderDescription) {
    let nav = doc.append(header, "nav", &["nav-menu"]);
    if desc.menu_close {
        doc.append(nav, "button", &["mobile-menu-close"]);
    }
    let list = doc.append(nav, "ul", &[]);
    for idx in 0..desc.menu_links {
        let item = doc.append(list, "li", &[]);
        let link = doc.append(item, "a", &[]);
        doc.set_attribute(link, "href", &format!("#section-{}", idx + 1));
    }
    if desc.menu_toggle {
        let toggle = doc.append(header, "button", &["mobile-menu-toggle"]);
        doc.append(toggle, "i", &["fa-bars"]);
    }
}

fn build_slider(doc: &mut Document, section: ElementId, desc: &HeroDescription) {
    let slider = doc.append(section, "div", &["dsn-slider"]);
    for slide in &desc.slides {
        let item = doc.append(slider, "div", &["slide-item"]);
        let bg = doc.append(item, "div", &["image-bg"]);
        if let Some(image) = &slide.image {
            doc.set_attribute(bg, "data-image-src", image);
        }
        if let Some(title) = &slide.title {
            let heading = doc.append(item, "h2", &["slide-title"]);
            doc.set_text(&heading, title);
        }
    }
    if desc.progress {
        let track = doc.append(slider, "div", &["slider-progress"]);
        doc.append(track, "div", &["progress-line"]);
    }
    if desc.counter {
        let count = doc.append(slider, "div", &["slider-nav-count"]);
        doc.append(count, "span", &["current"]);
        doc.append(count, "span", &["total"]);
    }
    if desc.dots {
        let dots = doc.append(slider, "div", &["slider-dots"]);
        for _ in &desc.slides {
            doc.append(dots, "span", &["dot"]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_slider_hooks() {
        let yaml = r#"
hero:
  slides:
    - image: img/hero-1.jpg
      title: Adaptive LED
    - image: img/hero-2.jpg
    - {}
"#;
        let desc: PageDescription = serde_yaml::from_str(yaml).unwrap();
        let doc = desc.build();
        assert_eq!(doc.query_all(None, ".dsn-slider .slide-item").len(), 3);
        assert_eq!(doc.query_all(None, ".image-bg[data-image-src]").len(), 2);
        assert_eq!(doc.query_all(None, ".dot").len(), 3);
        assert!(doc.query(None, ".slider-nav-count .current").is_some());
        assert!(doc.query(None, ".progress-line").is_some());
        // Header defaults apply when the block is omitted.
        assert_eq!(doc.query_all(None, ".nav-menu ul li a").len(), 4);
    }

    #[test]
    fn optional_hooks_can_be_disabled() {
        let yaml = r#"
header: null
hero:
  dots: false
  counter: false
  progress: false
  slides: [{ image: a.jpg }]
"#;
        let desc: PageDescription = serde_yaml::from_str(yaml).unwrap();
        let doc = desc.build();
        assert!(doc.query(None, ".header").is_none());
        assert!(doc.query(None, ".dot").is_none());
        assert!(doc.query(None, ".progress-line").is_none());
        assert!(doc.query(None, ".slider-nav-count .total").is_none());
    }

    #[test]
    fn reveal_blocks_sit_below_the_hero() {
        let desc = PageDescription {
            reveal: vec![RevealDescription {
                class: "feature-card".into(),
                top: 10.0,
                height: 200.0,
            }],
            ..PageDescription::default()
        };
        let doc = desc.build();
        let card = doc.query(None, ".feature-card").unwrap();
        // Header 80 + hero 900 + default featured section 600.
        assert_eq!(doc.rect(card).unwrap().top, 1580.0);
    }

    #[test]
    fn sections_stack_below_the_hero() {
        let yaml = r#"
sections:
  - id: featured
  - id: section-2
    height: 400
"#;
        let desc: PageDescription = serde_yaml::from_str(yaml).unwrap();
        let doc = desc.build();
        let featured = doc.query(None, "#featured").unwrap();
        let second = doc.query(None, "section#section-2").unwrap();
        assert_eq!(doc.rect(featured).unwrap().top, 980.0);
        assert_eq!(doc.rect(second).unwrap().top, 1580.0);
        assert_eq!(doc.rect(second).unwrap().height, 400.0);
        assert!(doc.query(None, ".hero .scroll-down").is_some());
    }
}
