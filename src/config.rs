use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Page description (YAML or JSON) the scripts bind to.
    pub page: Option<PathBuf>,
    /// Directory that slide image URLs resolve against.
    pub site_root: PathBuf,
    /// Hero slideshow timing, hooks and class names.
    pub slider: SliderConfig,
    /// Background image preloading.
    pub preload: PreloadConfig,
    /// Header, navigation drawer and scroll effects.
    pub chrome: ChromeConfig,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            page: None,
            site_root: PathBuf::from("."),
            slider: SliderConfig::default(),
            preload: PreloadConfig::default(),
            chrome: ChromeConfig::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(mut self) -> Result<Self> {
        self.slider
            .validate()
            .context("invalid slider configuration")?;
        self.preload
            .validate()
            .context("invalid preload configuration")?;
        self.chrome
            .validate()
            .context("invalid chrome configuration")?;
        if let Some(page) = &self.page {
            ensure!(
                !page.as_os_str().is_empty(),
                "page must not be an empty path"
            );
        }
        if self.site_root.as_os_str().is_empty() {
            self.site_root = PathBuf::from(".");
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SliderConfig {
    /// Time a slide stays active before the automatic advance.
    #[serde(with = "humantime_serde")]
    pub dwell: Duration,
    /// Interval between progress bar updates.
    #[serde(with = "humantime_serde")]
    pub progress_tick: Duration,
    /// Delay between marking the outgoing slide and activating the next one.
    #[serde(with = "humantime_serde")]
    pub exit_delay: Duration,
    /// How long the incoming slide keeps its entering mark.
    #[serde(with = "humantime_serde")]
    pub enter_delay: Duration,
    /// Minimum horizontal travel for a touch drag to count as a swipe.
    pub swipe_threshold_px: f64,
    pub selectors: SliderSelectors,
    pub classes: SlideClasses,
}

impl SliderConfig {
    fn validate(&self) -> Result<()> {
        ensure!(!self.dwell.is_zero(), "slider.dwell must be positive");
        ensure!(
            !self.progress_tick.is_zero(),
            "slider.progress-tick must be positive"
        );
        ensure!(
            self.progress_tick <= self.dwell,
            "slider.progress-tick must not exceed slider.dwell"
        );
        ensure!(
            self.swipe_threshold_px.is_finite() && self.swipe_threshold_px >= 0.0,
            "slider.swipe-threshold-px must be a non-negative number"
        );
        self.selectors.validate()?;
        self.classes.validate()
    }
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_millis(7000),
            progress_tick: Duration::from_millis(20),
            exit_delay: Duration::from_millis(400),
            enter_delay: Duration::from_millis(1000),
            swipe_threshold_px: 50.0,
            selectors: SliderSelectors::default(),
            classes: SlideClasses::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SliderSelectors {
    pub root: String,
    /// Resolved inside `root`, like every selector below.
    pub slides: String,
    pub progress: String,
    pub current: String,
    pub total: String,
    pub dots: String,
}

impl Default for SliderSelectors {
    fn default() -> Self {
        Self {
            root: ".dsn-slider".into(),
            slides: ".slide-item".into(),
            progress: ".progress-line".into(),
            current: ".slider-nav-count .current".into(),
            total: ".slider-nav-count .total".into(),
            dots: ".dot".into(),
        }
    }
}

impl SliderSelectors {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("root", &self.root),
            ("slides", &self.slides),
            ("progress", &self.progress),
            ("current", &self.current),
            ("total", &self.total),
            ("dots", &self.dots),
        ] {
            ensure!(
                !value.trim().is_empty(),
                "slider.selectors.{name} must not be empty"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SlideClasses {
    pub active: String,
    pub exiting: String,
    pub entering: String,
}

impl Default for SlideClasses {
    fn default() -> Self {
        Self {
            active: "active".into(),
            exiting: "slide-exit".into(),
            entering: "slide-enter".into(),
        }
    }
}

impl SlideClasses {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("active", &self.active),
            ("exiting", &self.exiting),
            ("entering", &self.entering),
        ] {
            ensure!(
                !value.is_empty() && !value.contains(char::is_whitespace),
                "slider.classes.{name} must be a single class name"
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct PreloadConfig {
    /// Elements declaring a background image.
    pub selector: String,
    /// Attribute carrying the image URL.
    pub attribute: String,
    /// Maximum number of image loads in flight.
    pub max_concurrent_loads: usize,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            selector: ".image-bg[data-image-src]".into(),
            attribute: "data-image-src".into(),
            max_concurrent_loads: 4,
        }
    }
}

impl PreloadConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.selector.trim().is_empty(),
            "preload.selector must not be empty"
        );
        ensure!(
            !self.attribute.trim().is_empty(),
            "preload.attribute must not be empty"
        );
        ensure!(
            self.max_concurrent_loads > 0,
            "preload.max-concurrent-loads must be greater than zero"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ChromeConfig {
    pub header: String,
    pub menu_toggle: String,
    pub menu_close: String,
    pub nav_menu: String,
    pub menu_links: String,
    pub hero: String,
    /// Button that scrolls the page to `scroll-down-target`.
    pub scroll_down: String,
    pub scroll_down_target: String,
    /// In-page links whose `href` names the element to scroll to.
    pub anchors: String,
    /// Blocks that fade in once they scroll into view.
    pub reveal: String,
    /// Scroll offset past which the header gets its `scrolled` class.
    pub scroll_threshold_px: f64,
    /// Distance above the viewport bottom a block must reach to be revealed.
    pub reveal_offset_px: f64,
    /// Per-element increment of the reveal transition delay.
    #[serde(with = "humantime_serde")]
    pub reveal_stagger: Duration,
    /// Hero background offset per scrolled pixel.
    pub parallax_factor: f64,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            header: ".header".into(),
            menu_toggle: ".mobile-menu-toggle".into(),
            menu_close: ".mobile-menu-close".into(),
            nav_menu: ".nav-menu".into(),
            menu_links: ".nav-menu ul li a".into(),
            hero: ".hero".into(),
            scroll_down: ".scroll-down".into(),
            scroll_down_target: "#featured".into(),
            anchors: "a[href^='#']".into(),
            reveal: ".section-header, .feature-card, .product-card, .category-card, .gallery-item"
                .into(),
            scroll_threshold_px: 100.0,
            reveal_offset_px: 150.0,
            reveal_stagger: Duration::from_millis(100),
            parallax_factor: 0.5,
        }
    }
}

impl ChromeConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.scroll_threshold_px.is_finite(),
            "chrome.scroll-threshold-px must be finite"
        );
        ensure!(
            self.reveal_offset_px.is_finite(),
            "chrome.reveal-offset-px must be finite"
        );
        ensure!(
            self.parallax_factor.is_finite(),
            "chrome.parallax-factor must be finite"
        );
        Ok(())
    }
}
