//! Engine-wide magic numbers for the static-map viewer.
//! Keeping them in a single place makes it easier to tweak them.

/// Size of the rendered map image in pixels (width, height).
pub const SCREEN_SIZE: (u32, u32) = (600, 450);

/// Inset of the map image inside the window, on every side.
pub const VIEWPORT_MARGIN: i32 = 10;

/// Number of screen pixels covering one span unit of degrees.
/// A pixel offset `d` maps to `d * span / PIXELS_PER_SPAN` degrees.
pub const PIXELS_PER_SPAN: f64 = 360.0;

/// Smallest span reachable by halving.
pub const MIN_SPAN: f64 = 0.02;

/// Largest span reachable by doubling.
pub const MAX_SPAN: f64 = 10_000.0;

/// Span shown at startup.
pub const DEFAULT_SPAN: f64 = 1.0;

/// Startup center (longitude, latitude): Moscow, Red Square.
pub const DEFAULT_CENTER: (f64, f64) = (37.617644, 55.755819);

/// Marker style appended to the `pt` parameter.
pub const MARKER_STYLE: &str = "pm2ntl";

/// Radius of the organization search area around a clicked point.
pub const SEARCH_RADIUS_METERS: f64 = 50.0;

/// Meters per degree of latitude on a spherical Earth.
pub const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Equatorial circumference of a spherical Earth in meters.
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_000.0;
