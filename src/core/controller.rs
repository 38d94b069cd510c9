//! The view controller: single owner of the [`ViewState`] and the current
//! map image.
//!
//! Every user intent arrives as an [`Action`] and runs to completion before
//! the next one is accepted: mutate state, refetch the image when the view
//! changed, replace the displayed image. A failed request is reported once
//! and leaves the previous image on screen.

use crate::{
    core::{
        config::ViewerConfig,
        geo::{pixel_to_coordinate, Coordinate, ViewportSize},
        view_state::ViewState,
    },
    input::{Action, InputEvent, InputHandler},
    services::{
        GeocodeClient, GeocodeResult, Lookup, MapImage, MapRequestBuilder, SearchClient,
        Transport,
    },
    MapError, Result,
};

/// Where the controller is within the handling of one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Fetching,
    Rendering,
}

/// What a dispatched action did
#[derive(Debug)]
pub enum Outcome {
    /// A new map image replaced the previous one
    Redrawn,
    /// Only the displayed text changed
    TextUpdated,
    /// The action had no observable effect
    Unchanged,
    /// A lookup reached its service and came back empty
    NothingFound,
    /// Input that does not map to anything, such as a click on the margin
    Ignored,
    /// A request failed; the previous image is still displayed
    Failed(MapError),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// What the text line currently shows
#[derive(Debug, Clone, PartialEq)]
enum TextSource {
    Empty,
    /// Derived from the stored geocode result
    Address,
    Organization,
}

pub struct ViewController<T: Transport> {
    state: ViewState,
    viewport: ViewportSize,
    map: MapRequestBuilder,
    geocoder: GeocodeClient,
    search: SearchClient,
    transport: T,
    phase: Phase,
    image: Option<MapImage>,
    generation: u64,
    last_result: Option<GeocodeResult>,
    display: TextSource,
    text: String,
    status: Option<String>,
}

impl<T: Transport> ViewController<T> {
    /// Builds the controller and fetches the initial image. Without that
    /// image there is nothing to show, so its failure is returned to the caller.
    pub fn new(config: ViewerConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let services = config.services;
        let view = config.view;

        let mut controller = Self {
            state: ViewState::new(view.center, view.zoom_span, view.zoom_bounds),
            viewport: view.viewport,
            map: MapRequestBuilder::new(services.static_map),
            geocoder: GeocodeClient::new(services.geocoder),
            search: SearchClient::new(services.search, services.lang, view.search_radius_m),
            transport,
            phase: Phase::Idle,
            image: None,
            generation: 0,
            last_result: None,
            display: TextSource::Empty,
            text: String::new(),
            status: None,
        };

        controller.refetch()?;
        Ok(controller)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// The image currently on screen
    pub fn image(&self) -> Option<&MapImage> {
        self.image.as_ref()
    }

    /// Incremented each time the displayed image is replaced
    pub fn image_generation(&self) -> u64 {
        self.generation
    }

    /// Address or organization line shown under the map
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Notice about the last action ("Nothing found", request failures)
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn last_result(&self) -> Option<&GeocodeResult> {
        self.last_result.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Routes a raw input event through `handler` and dispatches the result
    pub fn handle_event(&mut self, handler: &InputHandler, event: &InputEvent) -> Outcome {
        match handler.handle(event) {
            Some(action) => self.dispatch(action),
            None => Outcome::Ignored,
        }
    }

    /// Runs one action to completion. The exclusive borrow keeps actions
    /// strictly sequential: no second action can start while one is running.
    pub fn dispatch(&mut self, action: Action) -> Outcome {
        log::debug!("dispatch {:?}", action);
        self.status = None;

        let outcome = match action {
            Action::Move(direction) => {
                self.state.move_view(direction);
                self.redraw_if_dirty()
            }
            Action::Zoom(direction) => {
                self.state.zoom(direction);
                self.redraw_if_dirty()
            }
            Action::SetLayer(layer) => {
                self.state.set_layer(layer);
                self.redraw_if_dirty()
            }
            Action::PlaceMarker { x, y } => self.place_marker(x, y),
            Action::FindOrganization { x, y } => self.find_organization(x, y),
            Action::Search(query) => self.search_text(&query),
            Action::Clear => self.clear(),
            Action::SetShowPostalCode(enabled) => self.set_show_postal_code(enabled),
        };

        match &outcome {
            Outcome::Failed(e) => {
                log::error!("action failed: {}", e);
                self.status = Some(format!("Request failed: {e}"));
            }
            Outcome::NothingFound => {
                self.status = Some("Nothing found".to_string());
            }
            _ => {}
        }
        outcome
    }

    /// Releases the displayed image
    pub fn shutdown(&mut self) {
        if let Some(image) = self.image.take() {
            log::info!("released map image ({} bytes)", image.len());
        }
    }

    fn click_coordinate(&self, x: i32, y: i32) -> Option<Coordinate> {
        let coord = pixel_to_coordinate(
            self.state.center(),
            self.state.zoom_span(),
            x,
            y,
            self.viewport,
        );
        if coord.is_none() {
            log::debug!("click at ({}, {}) outside the map", x, y);
        }
        coord
    }

    fn place_marker(&mut self, x: i32, y: i32) -> Outcome {
        let Some(coord) = self.click_coordinate(x, y) else {
            return Outcome::Ignored;
        };
        match self.geocoder.lookup_by_coordinate(&self.transport, coord) {
            Err(e) => Outcome::Failed(e),
            Ok(Lookup::NotFound) => Outcome::NothingFound,
            Ok(Lookup::Found(result)) => {
                self.show_address(result);
                self.state.set_marker(Some(coord));
                self.redraw_with_text()
            }
        }
    }

    fn find_organization(&mut self, x: i32, y: i32) -> Outcome {
        let Some(coord) = self.click_coordinate(x, y) else {
            return Outcome::Ignored;
        };
        let toponym = match self.geocoder.lookup_by_coordinate(&self.transport, coord) {
            Err(e) => return Outcome::Failed(e),
            Ok(Lookup::NotFound) => return Outcome::NothingFound,
            Ok(Lookup::Found(toponym)) => toponym,
        };
        match self
            .search
            .find_nearby(&self.transport, coord, &toponym.raw_text)
        {
            Err(e) => Outcome::Failed(e),
            Ok(Lookup::NotFound) => Outcome::NothingFound,
            Ok(Lookup::Found(org)) => {
                self.text = org.display_text();
                self.display = TextSource::Organization;
                Outcome::TextUpdated
            }
        }
    }

    fn search_text(&mut self, query: &str) -> Outcome {
        let query = query.trim();
        if query.is_empty() {
            return Outcome::Ignored;
        }
        match self.geocoder.lookup_by_text(&self.transport, query) {
            Err(e) => Outcome::Failed(e),
            Ok(Lookup::NotFound) => Outcome::NothingFound,
            Ok(Lookup::Found(result)) => {
                let coord = result.coordinate;
                self.show_address(result);
                self.state.set_center(coord);
                self.state.set_marker(Some(coord));
                self.redraw_with_text()
            }
        }
    }

    fn clear(&mut self) -> Outcome {
        let had_text = !self.text.is_empty();
        self.last_result = None;
        self.display = TextSource::Empty;
        self.text.clear();
        self.state.set_marker(None);
        match self.redraw_if_dirty() {
            Outcome::Unchanged if had_text => Outcome::TextUpdated,
            other => other,
        }
    }

    fn set_show_postal_code(&mut self, enabled: bool) -> Outcome {
        self.state.set_show_postal_code(enabled);
        if !self.state.take_dirty().text {
            return Outcome::Unchanged;
        }
        match (&self.display, &self.last_result) {
            (TextSource::Address, Some(result)) => {
                self.text = result.display_text(enabled);
                Outcome::TextUpdated
            }
            _ => Outcome::Unchanged,
        }
    }

    fn show_address(&mut self, result: GeocodeResult) {
        self.text = result.display_text(self.state.show_postal_code());
        self.display = TextSource::Address;
        self.last_result = Some(result);
    }

    /// Like [`Self::redraw_if_dirty`] for actions that already changed the text
    fn redraw_with_text(&mut self) -> Outcome {
        match self.redraw_if_dirty() {
            Outcome::Unchanged => Outcome::TextUpdated,
            other => other,
        }
    }

    fn redraw_if_dirty(&mut self) -> Outcome {
        if !self.state.take_dirty().view {
            return Outcome::Unchanged;
        }
        match self.refetch() {
            Ok(()) => Outcome::Redrawn,
            Err(e) => Outcome::Failed(e),
        }
    }

    fn enter(&mut self, phase: Phase) {
        log::trace!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn refetch(&mut self) -> Result<()> {
        self.enter(Phase::Fetching);
        let fetched = self.map.fetch(&self.transport, &self.state);
        let image = match fetched {
            Ok(image) => image,
            Err(e) => {
                self.enter(Phase::Idle);
                return Err(e);
            }
        };

        self.enter(Phase::Rendering);
        self.image = Some(image);
        self.generation += 1;
        self.enter(Phase::Idle);
        Ok(())
    }
}
