use crate::error::PreloadError;
use crate::tasks::preloader::PreloadReport;

/// User input delivered by the page, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum PageInput<E> {
    /// Click or tap on `target`.
    Click(E),
    TouchStart { screen_x: f64 },
    TouchEnd { screen_x: f64 },
    Scroll { scroll_y: f64 },
    /// Relative and indexed navigation requests (keyboard, console).
    Next,
    Previous,
    GoTo(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Emitted by the preloader as each image settles, then once for the batch.
#[derive(Debug, Clone)]
pub enum PreloadEvent<E> {
    Loaded { element: E, image: LoadedImage },
    Failed { element: E, error: PreloadError },
    Settled(PreloadReport<E>),
}
