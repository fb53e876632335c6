use super::window::RollingWindow;

/// Mean +/- k * population std envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
}

impl Bands {
    /// Bands over a full window; `None` while the window is still filling.
    pub fn from_window(window: &RollingWindow, multiplier: f64) -> Option<Self> {
        if !window.is_full() {
            return None;
        }
        let mean = window.mean()?;
        let std_dev = window.std_dev()?;
        Some(Self {
            lower: mean - multiplier * std_dev,
            mean,
            upper: mean + multiplier * std_dev,
        })
    }
}
