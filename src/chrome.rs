//! Page chrome around the hero: the sticky header, the mobile navigation
//! drawer, in-page scrolling, scroll-reveal blocks and the hero parallax.
//!
//! Every hook is optional. A missing element disables its feature and
//! nothing else.

use std::fmt::Debug;

use page_model::{Surface, Viewport};
use tracing::debug;

use crate::config::ChromeConfig;
use crate::css;

const SCROLLED: &str = "scrolled";
const ACTIVE: &str = "active";
const SCROLL_REVEAL: &str = "scroll-reveal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChange {
    Opened,
    Closed,
    Unchanged,
}

/// What a click did to the chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOutcome {
    pub menu: MenuChange,
    /// Page offset scrolled to, when the click hit an in-page link.
    pub scrolled_to: Option<f64>,
}

#[derive(Debug)]
pub struct Chrome<E> {
    header: Option<E>,
    menu_toggle: Option<E>,
    menu_close: Option<E>,
    nav_menu: Option<E>,
    menu_links: Vec<E>,
    hero: Option<E>,
    scroll_down: Option<E>,
    scroll_down_target: String,
    anchors: Vec<E>,
    reveal: Vec<E>,
    scroll_threshold: f64,
    reveal_offset: f64,
    parallax_factor: f64,
}

impl<E: Clone + Eq + Debug> Chrome<E> {
    /// Binds the chrome hooks, staggers the reveal blocks and applies the
    /// scroll-dependent state once for the initial scroll offset.
    pub fn mount<S>(surface: &mut S, cfg: &ChromeConfig) -> Self
    where
        S: Surface<Element = E>,
    {
        let find = |selector: &str| {
            let found = surface.query(None, selector);
            if found.is_none() {
                debug!(selector, "chrome hook missing");
            }
            found
        };
        let chrome = Self {
            header: find(&cfg.header),
            menu_toggle: find(&cfg.menu_toggle),
            menu_close: find(&cfg.menu_close),
            nav_menu: find(&cfg.nav_menu),
            menu_links: surface.query_all(None, &cfg.menu_links),
            hero: find(&cfg.hero),
            scroll_down: find(&cfg.scroll_down),
            scroll_down_target: cfg.scroll_down_target.clone(),
            anchors: surface.query_all(None, &cfg.anchors),
            reveal: surface.query_all(None, &cfg.reveal),
            scroll_threshold: cfg.scroll_threshold_px,
            reveal_offset: cfg.reveal_offset_px,
            parallax_factor: cfg.parallax_factor,
        };

        let stagger = cfg.reveal_stagger.as_secs_f64();
        for (index, element) in chrome.reveal.iter().enumerate() {
            surface.add_class(element, SCROLL_REVEAL);
            let delay = css::number(stagger * index as f64, 3);
            surface.set_style(element, "transition-delay", &format!("{delay}s"));
        }
        debug!(
            reveal = chrome.reveal.len(),
            links = chrome.menu_links.len(),
            anchors = chrome.anchors.len(),
            "chrome mounted"
        );

        chrome.on_scroll(surface);
        chrome
    }

    /// Re-applies every scroll-dependent effect for the surface's current
    /// viewport.
    pub fn on_scroll<S>(&self, surface: &mut S)
    where
        S: Surface<Element = E>,
    {
        let viewport = surface.viewport();
        if let Some(header) = &self.header {
            if viewport.scroll_y > self.scroll_threshold {
                surface.add_class(header, SCROLLED);
            } else {
                surface.remove_class(header, SCROLLED);
            }
        }
        self.reveal_visible(surface, viewport);
        if let Some(hero) = &self.hero {
            if viewport.scroll_y < viewport.height {
                let offset = css::number(viewport.scroll_y * self.parallax_factor, 2);
                surface.set_style(hero, "background-position-y", &format!("{offset}px"));
            }
        }
    }

    fn reveal_visible<S>(&self, surface: &mut S, viewport: Viewport)
    where
        S: Surface<Element = E>,
    {
        let line = viewport.height - self.reveal_offset;
        let mut revealed = 0;
        for element in &self.reveal {
            if surface.has_class(element, ACTIVE) {
                continue;
            }
            if surface.bounding_rect(element).top < line {
                surface.add_class(element, ACTIVE);
                revealed += 1;
            }
        }
        if revealed > 0 {
            debug!(revealed, scroll_y = viewport.scroll_y, "blocks revealed");
        }
    }

    /// Routes a click to the navigation drawer and to in-page scrolling.
    pub fn on_click<S>(&self, surface: &mut S, target: &E) -> ClickOutcome
    where
        S: Surface<Element = E>,
    {
        let menu = self.route_menu(surface, target);
        let scrolled_to = self.route_scroll(surface, target);
        ClickOutcome { menu, scrolled_to }
    }

    fn route_menu<S>(&self, surface: &mut S, target: &E) -> MenuChange
    where
        S: Surface<Element = E>,
    {
        let Some(nav) = &self.nav_menu else {
            return MenuChange::Unchanged;
        };
        let within = |hook: &Option<E>| hook.as_ref().is_some_and(|el| surface.contains(el, target));

        if within(&self.menu_toggle) {
            return self.set_menu(surface, true);
        }
        if within(&self.menu_close)
            || self.menu_links.iter().any(|link| surface.contains(link, target))
        {
            return self.set_menu(surface, false);
        }
        if surface.has_class(nav, ACTIVE) && !surface.contains(nav, target) {
            return self.set_menu(surface, false);
        }
        MenuChange::Unchanged
    }

    fn route_scroll<S>(&self, surface: &mut S, target: &E) -> Option<f64>
    where
        S: Surface<Element = E>,
    {
        if let Some(button) = &self.scroll_down {
            if surface.contains(button, target) {
                return self.scroll_into_view(surface, &self.scroll_down_target);
            }
        }
        let anchor = self
            .anchors
            .iter()
            .find(|anchor| surface.contains(anchor, target))?;
        let href = surface.attribute(anchor, "href")?;
        if href == "#" {
            return None;
        }
        self.scroll_into_view(surface, &href)
    }

    /// Scrolls so the element matching `selector` sits at the viewport top.
    fn scroll_into_view<S>(&self, surface: &mut S, selector: &str) -> Option<f64>
    where
        S: Surface<Element = E>,
    {
        let Some(element) = surface.query(None, selector) else {
            debug!(selector, "scroll target missing");
            return None;
        };
        let viewport = surface.viewport();
        let scroll_y = (viewport.scroll_y + surface.bounding_rect(&element).top).max(0.0);
        surface.scroll_to(scroll_y);
        self.on_scroll(surface);
        debug!(selector, scroll_y, "scrolled into view");
        Some(scroll_y)
    }

    pub fn is_menu_open<S>(&self, surface: &S) -> bool
    where
        S: Surface<Element = E>,
    {
        self.nav_menu
            .as_ref()
            .is_some_and(|nav| surface.has_class(nav, ACTIVE))
    }

    fn set_menu<S>(&self, surface: &mut S, open: bool) -> MenuChange
    where
        S: Surface<Element = E>,
    {
        let was_open = self.is_menu_open(surface);
        for hook in [&self.nav_menu, &self.menu_toggle].into_iter().flatten() {
            if open {
                surface.add_class(hook, ACTIVE);
            } else {
                surface.remove_class(hook, ACTIVE);
            }
        }
        match (was_open, open) {
            (false, true) => {
                debug!("navigation drawer opened");
                MenuChange::Opened
            }
            (true, false) => {
                debug!("navigation drawer closed");
                MenuChange::Closed
            }
            _ => MenuChange::Unchanged,
        }
    }
}
