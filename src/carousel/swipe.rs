#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: show the next slide.
    Left,
    /// Finger moved right: show the previous slide.
    Right,
}

/// Classifies a horizontal drag. Travel must strictly exceed `threshold`.
pub fn classify(delta_x: f64, threshold: f64) -> Option<SwipeDirection> {
    if delta_x < -threshold {
        Some(SwipeDirection::Left)
    } else if delta_x > threshold {
        Some(SwipeDirection::Right)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f64,
    start_x: Option<f64>,
}

impl SwipeTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start_x: None,
        }
    }

    pub fn touch_start(&mut self, screen_x: f64) {
        self.start_x = Some(screen_x);
    }

    /// Ends the gesture. A touch end without a matching start is not a swipe.
    pub fn touch_end(&mut self, screen_x: f64) -> Option<SwipeDirection> {
        let start = self.start_x.take()?;
        classify(screen_x - start, self.threshold)
    }
}
