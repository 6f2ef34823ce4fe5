//! Scroll area
//!
//! A vertical custom scrollbar over a natively scrolling viewport. The host
//! reports viewport metrics and the track rect; the scroll area derives the
//! thumb geometry and turns track clicks and thumb drags into `scroll_top`.

use std::sync::{Arc, Mutex};

use masterclass_core::{Attributes, EventResult, LockExt, Point, PointerId, Rect};

/// Thumbs never shrink below this many pixels
pub const MIN_THUMB_SIZE: f32 = 20.0;

/// Viewport scroll metrics, as a DOM element reports them
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ScrollMetrics {
    pub fn has_overflow(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Largest reachable `scroll_top`
    pub fn max_scroll(&self) -> f32 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    pub fn thumb_size(&self, track_height: f32) -> f32 {
        if self.scroll_height <= 0.0 {
            return MIN_THUMB_SIZE;
        }
        (self.client_height / self.scroll_height * track_height).max(MIN_THUMB_SIZE)
    }

    pub fn thumb_offset(&self, track_height: f32) -> f32 {
        let distance = self.max_scroll();
        let ratio = if distance > 0.0 {
            self.scroll_top / distance
        } else {
            0.0
        };
        ratio * (track_height - self.thumb_size(track_height))
    }
}

#[derive(Debug, Default)]
struct ScrollInner {
    metrics: ScrollMetrics,
    track: Rect,
    capture: Option<PointerId>,
}

#[derive(Clone, Debug, Default)]
pub struct ScrollArea {
    inner: Arc<Mutex<ScrollInner>>,
}

impl ScrollArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host-reported viewport size; `scroll_top` is re-clamped
    pub fn set_viewport(&self, scroll_height: f32, client_height: f32) {
        let mut inner = self.inner.locked();
        inner.metrics.scroll_height = scroll_height;
        inner.metrics.client_height = client_height;
        let max = inner.metrics.max_scroll();
        inner.metrics.scroll_top = inner.metrics.scroll_top.clamp(0.0, max);
    }

    pub fn set_track(&self, rect: Rect) {
        self.inner.locked().track = rect;
    }

    /// The viewport scrolled, natively or programmatically
    pub fn scroll_to(&self, top: f32) {
        let mut inner = self.inner.locked();
        let max = inner.metrics.max_scroll();
        inner.metrics.scroll_top = top.clamp(0.0, max);
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.inner.locked().metrics
    }

    pub fn scroll_top(&self) -> f32 {
        self.metrics().scroll_top
    }

    pub fn thumb_size(&self) -> f32 {
        let inner = self.inner.locked();
        inner.metrics.thumb_size(inner.track.height)
    }

    pub fn thumb_offset(&self) -> f32 {
        let inner = self.inner.locked();
        inner.metrics.thumb_offset(inner.track.height)
    }

    pub fn scrollbar(&self) -> Scrollbar {
        Scrollbar { root: self.clone() }
    }

    pub fn thumb(&self) -> ScrollThumb {
        ScrollThumb { root: self.clone() }
    }
}

#[derive(Clone, Debug)]
pub struct Scrollbar {
    root: ScrollArea,
}

impl Scrollbar {
    /// Hidden when the content fits
    pub fn is_rendered(&self) -> bool {
        self.root.metrics().has_overflow()
    }

    /// Click on the bare track jumps proportionally
    pub fn click(&self, point: Point) -> EventResult {
        let mut inner = self.root.inner.locked();
        let track = inner.track;
        if track.height <= 0.0 || !inner.metrics.has_overflow() {
            return EventResult::Ignored;
        }
        let ratio = (point.y - track.top) / track.height;
        inner.metrics.scroll_top = (ratio * inner.metrics.max_scroll()).clamp(0.0, inner.metrics.max_scroll());
        EventResult::Handled
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::with_role("scrollbar").set("aria-orientation", "vertical")
    }
}

#[derive(Clone, Debug)]
pub struct ScrollThumb {
    root: ScrollArea,
}

impl ScrollThumb {
    pub fn pointer_down(&self, pointer: PointerId) -> EventResult {
        self.root.inner.locked().capture = Some(pointer);
        EventResult::Handled
    }

    pub fn pointer_move(&self, pointer: PointerId, point: Point) -> EventResult {
        let mut inner = self.root.inner.locked();
        if inner.capture != Some(pointer) {
            return EventResult::Ignored;
        }
        let track = inner.track;
        let thumb = inner.metrics.thumb_size(track.height);
        let scrollable = track.height - thumb;
        let ratio = if scrollable > 0.0 {
            ((point.y - track.top - thumb / 2.0) / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };
        inner.metrics.scroll_top = ratio * inner.metrics.max_scroll();
        EventResult::Handled
    }

    pub fn pointer_up(&self, pointer: PointerId) -> EventResult {
        let mut inner = self.root.inner.locked();
        if inner.capture == Some(pointer) {
            inner.capture = None;
            EventResult::Handled
        } else {
            EventResult::Ignored
        }
    }

    pub fn attrs(&self) -> Attributes {
        Attributes::new().set(
            "style",
            format!(
                "top: {}px; height: {}px",
                self.root.thumb_offset(),
                self.root.thumb_size()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> ScrollArea {
        let area = ScrollArea::new();
        area.set_viewport(1000.0, 200.0);
        area.set_track(Rect::new(0.0, 0.0, 8.0, 200.0));
        area
    }

    #[test]
    fn test_thumb_geometry() {
        let area = area();
        assert_eq!(area.thumb_size(), 40.0);
        assert_eq!(area.thumb_offset(), 0.0);

        area.scroll_to(800.0);
        assert_eq!(area.thumb_offset(), 160.0);

        area.scroll_to(5000.0);
        assert_eq!(area.scroll_top(), 800.0);
    }

    #[test]
    fn test_minimum_thumb_size() {
        let metrics = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height: 100_000.0,
            client_height: 100.0,
        };
        assert_eq!(metrics.thumb_size(100.0), MIN_THUMB_SIZE);
    }

    #[test]
    fn test_track_click() {
        let area = area();
        area.scrollbar().click(Point::new(4.0, 50.0));
        assert_eq!(area.scroll_top(), 200.0);
    }

    #[test]
    fn test_thumb_drag() {
        let area = area();
        let thumb = area.thumb();

        assert_eq!(thumb.pointer_move(1, Point::new(0.0, 120.0)), EventResult::Ignored);

        thumb.pointer_down(1);
        // (120 - 20) / (200 - 40) = 0.625
        thumb.pointer_move(1, Point::new(0.0, 120.0));
        assert_eq!(area.scroll_top(), 500.0);

        thumb.pointer_move(1, Point::new(0.0, 900.0));
        assert_eq!(area.scroll_top(), 800.0);

        thumb.pointer_up(1);
        thumb.pointer_move(1, Point::new(0.0, 0.0));
        assert_eq!(area.scroll_top(), 800.0);
    }

    #[test]
    fn test_no_overflow_hides_scrollbar() {
        let area = ScrollArea::new();
        area.set_viewport(100.0, 200.0);
        assert!(!area.scrollbar().is_rendered());
        assert_eq!(area.scrollbar().click(Point::new(0.0, 10.0)), EventResult::Ignored);
    }
}
