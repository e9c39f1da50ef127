use std::fmt::Debug;

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Vertical scroll offset of the page.
    pub scroll_y: f64,
    /// Height of the visible area.
    pub height: f64,
}

/// Capabilities the slideshow needs from whatever renders the page.
///
/// Lookups never fail loudly: an absent element is `None` or an empty list,
/// and mutations on a stale handle are ignored. Callers treat a missing hook
/// as "skip this feature".
pub trait Surface {
    type Element: Clone + Eq + Debug;

    /// First element matching `selector`, searching the descendants of
    /// `scope` (or the whole page when `scope` is `None`).
    fn query(&self, scope: Option<&Self::Element>, selector: &str) -> Option<Self::Element> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// All matching elements in document order.
    fn query_all(&self, scope: Option<&Self::Element>, selector: &str) -> Vec<Self::Element>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn add_class(&mut self, element: &Self::Element, class: &str);
    fn remove_class(&mut self, element: &Self::Element, class: &str);

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    fn style(&self, element: &Self::Element, property: &str) -> Option<String>;
    fn set_style(&mut self, element: &Self::Element, property: &str, value: &str);

    fn text(&self, element: &Self::Element) -> Option<String>;
    fn set_text(&mut self, element: &Self::Element, text: &str);

    /// Element box relative to the viewport.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// True when `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;

    fn viewport(&self) -> Viewport;

    /// Moves the page's vertical scroll offset.
    fn scroll_to(&mut self, scroll_y: f64);
}
