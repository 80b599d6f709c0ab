//! Clamped zoom factor for the rendered preview.

pub const MIN_ZOOM: u16 = 50;
pub const MAX_ZOOM: u16 = 200;
pub const DEFAULT_ZOOM: u16 = 100;
pub const ZOOM_STEP: u16 = 10;

/// Integer zoom percentage, always within `[MIN_ZOOM, MAX_ZOOM]`.
///
/// There is no unclamped mutation path: out-of-range values are clamped,
/// never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomController {
    zoom: u16,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}

impl ZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> u16 {
        self.zoom
    }

    /// The factor applied to the preview body, `zoom / 100`.
    pub fn scale(&self) -> f64 {
        f64::from(self.zoom) / 100.0
    }

    pub fn zoom_in(&mut self) -> u16 {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> u16 {
        self.zoom = self.zoom.saturating_sub(ZOOM_STEP).max(MIN_ZOOM);
        self.zoom
    }

    pub fn reset(&mut self) -> u16 {
        self.zoom = DEFAULT_ZOOM;
        self.zoom
    }

    /// Snap an externally supplied value to the step grid and clamp it
    /// into range.
    pub fn set(&mut self, zoom: u16) -> u16 {
        let snapped = zoom.saturating_add(ZOOM_STEP / 2) / ZOOM_STEP * ZOOM_STEP;
        self.zoom = snapped.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom
    }
}
