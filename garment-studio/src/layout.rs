//! Fitting surfaces into their containers, and debouncing window resizes.

use az::SaturatingAs;
use garment_core::{engine::Mount, surface::SURFACE_ASPECT};

/// Surfaces never get narrower than this, in CSS pixels.
pub const MIN_CSS_WIDTH: f32 = 140.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fit {
    /// On-screen size in CSS pixels.
    pub css: [u32; 2],
    /// Backing store size in device pixels.
    pub backing: [u32; 2],
}

/// Size a surface to its container, keeping the garment's aspect ratio.
#[must_use]
pub fn fit(mount: &Mount, device_pixel_ratio: f32) -> Fit {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    let available = mount.container_width - mount.padding[0] - mount.padding[1];
    // NaN fails the comparison inside max and is replaced.
    let width = available.max(MIN_CSS_WIDTH).round();
    let height = (width * SURFACE_ASPECT).round();
    Fit {
        css: [width.saturating_as(), height.saturating_as()],
        backing: [
            (width * dpr).round().saturating_as(),
            (height * dpr).round().saturating_as(),
        ],
    }
}

/// Coalesces a burst of resize notifications into one refit, once the burst has been quiet for a while.
pub struct ResizeDebouncer {
    quiet: std::time::Duration,
    last: Option<std::time::Instant>,
}
impl ResizeDebouncer {
    #[must_use]
    pub fn new(quiet: std::time::Duration) -> Self {
        Self { quiet, last: None }
    }
    /// A resize happened at `now`. Restarts the quiet period.
    pub fn notify(&mut self, now: std::time::Instant) {
        self.last = Some(now);
    }
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.last.is_some()
    }
    /// Whether the burst is over and the refit should run now. Returns `true` once per burst.
    pub fn poll(&mut self, now: std::time::Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) >= self.quiet => {
                self.last = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::{Duration, Instant};

    fn mount(width: f32) -> Mount {
        Mount {
            id: "frontCanvas".into(),
            container_width: width,
            padding: [12.0, 12.0],
        }
    }
    #[test]
    fn fit_keeps_aspect() {
        let fit = fit(&mount(524.0), 2.0);
        assert_eq!(fit.css, [500, 700]);
        assert_eq!(fit.backing, [1000, 1400]);
    }
    #[test]
    fn fit_has_minimum() {
        assert_eq!(fit(&mount(20.0), 1.0).css, [140, 196]);
        assert_eq!(fit(&mount(f32::NAN), 1.0).css, [140, 196]);
        // Nonsense pixel ratios are ignored.
        assert_eq!(fit(&mount(20.0), 0.0).backing, [140, 196]);
    }
    #[test]
    fn debounce_coalesces_bursts() {
        let quiet = Duration::from_millis(120);
        let mut debouncer = ResizeDebouncer::new(quiet);
        let start = Instant::now();
        assert!(!debouncer.poll(start));

        for step in 0..5 {
            let at = start + Duration::from_millis(step * 50);
            debouncer.notify(at);
            assert!(!debouncer.poll(at + Duration::from_millis(10)));
        }
        let last = start + Duration::from_millis(200);
        assert!(!debouncer.poll(last + Duration::from_millis(119)));
        assert!(debouncer.poll(last + quiet));
        assert!(!debouncer.poll(last + quiet * 2));
        assert!(!debouncer.is_pending());
    }
}
