//! Rendering-surface contract shared by the slideshow crates.
//!
//! The [`Surface`] trait is the only thing the slideshow core knows about the
//! page: element lookup by selector, class-list mutation, inline styles,
//! attributes, text and geometry. [`Document`] is an in-memory implementation
//! used by the CLI and by tests, and [`PageDescription`] builds one from a
//! YAML or JSON description of the site's hero markup.

mod document;
mod page;
mod selector;
mod surface;

pub use document::{Document, ElementId};
pub use page::{
    HeaderDescription, HeroDescription, PageDescription, RevealDescription, SectionDescription,
    SlideDescription,
};
pub use selector::{Selector, SelectorError};
pub use surface::{Rect, Surface, Viewport};
