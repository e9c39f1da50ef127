use std::time::Duration;

use page_model::Surface;
use tracing::{debug, warn};

use crate::carousel::{Carousel, Navigation};
use crate::chrome::Chrome;
use crate::config::Configuration;
use crate::events::{PageInput, PreloadEvent};

/// A mounted landing page: the surface plus the scripts bound to it.
#[derive(Debug)]
pub struct Site<S: Surface> {
    surface: S,
    carousel: Carousel<S::Element>,
    chrome: Chrome<S::Element>,
}

impl<S: Surface> Site<S> {
    pub fn mount(mut surface: S, cfg: &Configuration, now: Duration) -> Self {
        let chrome = Chrome::mount(&mut surface, &cfg.chrome);
        let carousel = Carousel::mount(&mut surface, &cfg.slider, now);
        Self {
            surface,
            carousel,
            chrome,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn carousel(&self) -> &Carousel<S::Element> {
        &self.carousel
    }

    pub fn chrome(&self) -> &Chrome<S::Element> {
        &self.chrome
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Routes one page input at page-clock `now`. Returns the carousel
    /// outcome when the input was a slideshow request.
    pub fn handle(&mut self, input: PageInput<S::Element>, now: Duration) -> Option<Navigation> {
        match input {
            PageInput::Click(target) => {
                self.chrome.on_click(&mut self.surface, &target);
                let index = self.carousel.dot_index(&self.surface, &target)?;
                debug!(index, "dot clicked");
                Some(self.carousel.go_to(&mut self.surface, index, now))
            }
            PageInput::TouchStart { screen_x } => {
                self.carousel.touch_start(screen_x);
                None
            }
            PageInput::TouchEnd { screen_x } => {
                self.carousel.touch_end(&mut self.surface, screen_x, now)
            }
            PageInput::Scroll { scroll_y } => {
                self.surface.scroll_to(scroll_y);
                self.chrome.on_scroll(&mut self.surface);
                None
            }
            PageInput::Next => Some(self.carousel.next(&mut self.surface, now)),
            PageInput::Previous => Some(self.carousel.previous(&mut self.surface, now)),
            PageInput::GoTo(index) => Some(self.carousel.go_to(&mut self.surface, index, now)),
        }
    }

    /// Paints a preloaded background. Failures leave the element untouched.
    pub fn apply_preload(&mut self, event: &PreloadEvent<S::Element>) {
        match event {
            PreloadEvent::Loaded { element, image } => {
                let value = format!("url({})", image.url);
                self.surface.set_style(element, "background-image", &value);
            }
            PreloadEvent::Failed { error, .. } => {
                debug!(url = error.url(), "background left unset");
            }
            PreloadEvent::Settled(report) => {
                if !report.all_loaded() {
                    warn!(
                        failed = report.failures().len(),
                        loaded = report.loaded.len(),
                        "slideshow shown with missing backgrounds"
                    );
                }
            }
        }
    }

    pub fn advance(&mut self, now: Duration) -> usize {
        self.carousel.advance(&mut self.surface, now)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.carousel.next_deadline()
    }

    pub fn shutdown(&mut self) {
        self.carousel.shutdown(&mut self.surface);
    }
}
