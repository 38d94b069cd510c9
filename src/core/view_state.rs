use crate::core::constants::PIXELS_PER_SPAN;
use crate::core::geo::{clamp_zoom_within, pan_by, Coordinate, ZoomBounds, ZoomDirection};
use serde::{Deserialize, Serialize};

/// Map layer rendered by the static-map service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Layer {
    /// Schematic road map
    #[default]
    Map,
    /// Satellite imagery
    Satellite,
    /// Satellite imagery with street and place labels
    Hybrid,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Map, Layer::Satellite, Layer::Hybrid];

    /// Layer id sent as the `l` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            Layer::Map => "map",
            Layer::Satellite => "sat",
            Layer::Hybrid => "sat,skl",
        }
    }
}

/// Panning direction for keyboard navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Screen pixel offset of one navigation step
    fn pixel_step(&self) -> (i32, i32) {
        let step = PIXELS_PER_SPAN as i32;
        match self {
            Direction::Up => (0, -step),
            Direction::Down => (0, step),
            Direction::Left => (-step, 0),
            Direction::Right => (step, 0),
        }
    }
}

/// Changes raised by [`ViewState`] mutators since the last [`ViewState::take_dirty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags {
    /// A field sent with the map request changed; the image must be refetched
    pub view: bool,
    /// Only displayed text is affected
    pub text: bool,
}

impl DirtyFlags {
    pub fn is_clean(&self) -> bool {
        !self.view && !self.text
    }
}

/// The mutable view: what the map image shows and how text is displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    center: Coordinate,
    zoom_span: f64,
    layer: Layer,
    marker: Option<Coordinate>,
    show_postal_code: bool,
    bounds: ZoomBounds,
    #[serde(skip)]
    dirty: DirtyFlags,
}

impl ViewState {
    /// Creates a new view state; the span is pulled into `bounds`
    pub fn new(center: Coordinate, zoom_span: f64, bounds: ZoomBounds) -> Self {
        let zoom_span = if zoom_span.is_finite() {
            zoom_span.clamp(bounds.min, bounds.max)
        } else {
            bounds.min
        };
        Self {
            center: center.normalized(),
            zoom_span,
            layer: Layer::default(),
            marker: None,
            show_postal_code: false,
            bounds,
            dirty: DirtyFlags::default(),
        }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom_span(&self) -> f64 {
        self.zoom_span
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    pub fn show_postal_code(&self) -> bool {
        self.show_postal_code
    }

    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Pans one span unit in `direction`
    pub fn move_view(&mut self, direction: Direction) {
        let (dx, dy) = direction.pixel_step();
        let center = pan_by(self.center, self.zoom_span, dx, dy);
        self.set_center(center);
    }

    /// Halves or doubles the span; a step out of bounds changes nothing
    pub fn zoom(&mut self, direction: ZoomDirection) {
        let span = clamp_zoom_within(self.zoom_span, direction, self.bounds);
        if span != self.zoom_span {
            self.zoom_span = span;
            self.dirty.view = true;
        }
    }

    /// Moves the view center. Out-of-range values are normalized and
    /// non-finite ones are ignored.
    pub fn set_center(&mut self, center: Coordinate) {
        if !(center.longitude.is_finite() && center.latitude.is_finite()) {
            return;
        }
        let center = center.normalized();
        if center != self.center {
            self.center = center;
            self.dirty.view = true;
        }
    }

    pub fn set_layer(&mut self, layer: Layer) {
        if layer != self.layer {
            self.layer = layer;
            self.dirty.view = true;
        }
    }

    pub fn set_marker(&mut self, marker: Option<Coordinate>) {
        let marker = marker.map(|m| m.normalized());
        if marker != self.marker {
            self.marker = marker;
            self.dirty.view = true;
        }
    }

    pub fn set_show_postal_code(&mut self, enabled: bool) {
        if enabled != self.show_postal_code {
            self.show_postal_code = enabled;
            self.dirty.text = true;
        }
    }

    /// Returns and resets the pending change flags
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        let (lon, lat) = crate::core::constants::DEFAULT_CENTER;
        Self::new(
            Coordinate::new(lon, lat),
            crate::core::constants::DEFAULT_SPAN,
            ZoomBounds::default(),
        )
    }
}
