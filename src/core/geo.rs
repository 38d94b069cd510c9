use crate::core::constants::{
    EARTH_CIRCUMFERENCE_METERS, MAX_SPAN, METERS_PER_DEGREE_LAT, MIN_SPAN, PIXELS_PER_SPAN,
    VIEWPORT_MARGIN,
};
use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate in the service's "lon,lat" order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Wraps longitude to [-180, 180] range
    pub fn wrap_lng(lng: f64) -> f64 {
        let wrapped = lng % 360.0;
        if wrapped > 180.0 {
            wrapped - 360.0
        } else if wrapped < -180.0 {
            wrapped + 360.0
        } else {
            wrapped
        }
    }

    /// Clamps latitude to valid range
    pub fn clamp_lat(lat: f64) -> f64 {
        lat.clamp(-90.0, 90.0)
    }

    /// Brings the coordinate back into range: longitude wraps, latitude clamps
    pub fn normalized(&self) -> Self {
        Self::new(Self::wrap_lng(self.longitude), Self::clamp_lat(self.latitude))
    }

    /// Formats as the `"<lon>,<lat>"` pair the map services expect
    pub fn to_param(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }

    /// Same as [`Coordinate::to_param`] with a fixed number of decimals
    pub fn to_param_fixed(&self, decimals: usize) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            self.longitude,
            self.latitude,
            prec = decimals
        )
    }

    /// Parses the geocoder's space separated `"lon lat"` position
    pub fn from_pos(pos: &str) -> Option<Self> {
        let mut parts = pos.split_whitespace();
        let longitude = parts.next()?.parse::<f64>().ok()?;
        let latitude = parts.next()?.parse::<f64>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        let coord = Self::new(longitude, latitude);
        coord.is_valid().then_some(coord)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Pixel dimensions of the drawn map image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel position of the image center in window coordinates
    pub fn center_pixel(&self) -> (i32, i32) {
        (
            VIEWPORT_MARGIN + self.width as i32 / 2,
            VIEWPORT_MARGIN + self.height as i32 / 2,
        )
    }

    /// Whether a window position falls strictly inside the drawn image
    pub fn contains(&self, px: i32, py: i32) -> bool {
        VIEWPORT_MARGIN < px
            && px < self.width as i32 + VIEWPORT_MARGIN
            && VIEWPORT_MARGIN < py
            && py < self.height as i32 + VIEWPORT_MARGIN
    }
}

/// Zoom step direction. Zooming in shows a smaller span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Inclusive span limits reachable by halving/doubling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, span: f64) -> bool {
        span.is_finite() && span >= self.min && span <= self.max
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        ZOOM_BOUNDS
    }
}

/// Default span limits
pub const ZOOM_BOUNDS: ZoomBounds = ZoomBounds {
    min: MIN_SPAN,
    max: MAX_SPAN,
};

/// Halves the span on zoom-in and doubles it on zoom-out, using [`ZOOM_BOUNDS`]
pub fn clamp_zoom(current: f64, direction: ZoomDirection) -> f64 {
    clamp_zoom_within(current, direction, ZOOM_BOUNDS)
}

/// Like [`clamp_zoom`] with explicit bounds. A step that would leave the
/// bounds is a no-op and returns `current` unchanged.
pub fn clamp_zoom_within(current: f64, direction: ZoomDirection, bounds: ZoomBounds) -> f64 {
    let next = match direction {
        ZoomDirection::In => current * 0.5,
        ZoomDirection::Out => current * 2.0,
    };
    if bounds.contains(next) {
        next
    } else {
        current
    }
}

/// Shifts `center` by a screen pixel offset at the given span.
///
/// Screen y grows downward while latitude grows upward, so `dy` is negated.
pub fn pan_by(center: Coordinate, zoom_span: f64, dx: i32, dy: i32) -> Coordinate {
    let moved = Coordinate::new(
        center.longitude + dx as f64 * zoom_span / PIXELS_PER_SPAN,
        center.latitude - dy as f64 * zoom_span / PIXELS_PER_SPAN,
    )
    .normalized();

    if moved.longitude.is_finite() && moved.latitude.is_finite() {
        moved
    } else {
        center
    }
}

/// Maps a window click position to a coordinate, relative to the image center.
///
/// Returns `None` for clicks on the margin or outside the image.
pub fn pixel_to_coordinate(
    viewport_center: Coordinate,
    zoom_span: f64,
    px: i32,
    py: i32,
    viewport: ViewportSize,
) -> Option<Coordinate> {
    if !viewport.contains(px, py) {
        return None;
    }
    let (cx, cy) = viewport.center_pixel();
    Some(pan_by(viewport_center, zoom_span, px - cx, py - cy))
}

/// Degree span `(lon, lat)` covering `radius_meters` around `coord`
pub fn search_span(coord: Coordinate, radius_meters: f64) -> (f64, f64) {
    let lat_span = radius_meters / METERS_PER_DEGREE_LAT;
    let meters_per_degree_lon =
        coord.latitude.to_radians().cos() * EARTH_CIRCUMFERENCE_METERS / 360.0;
    let lon_span = radius_meters / meters_per_degree_lon;
    (lon_span, lat_span)
}
