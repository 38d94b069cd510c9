use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use mapview::{
    core::config::ServiceEndpoint, Action, Coordinate, Direction, HttpResponse, InputEvent,
    InputHandler, KeyCode, Layer, MapError, MouseButton, Outcome, RequestParams, Transport,
    ViewController, ViewerConfig, ZoomDirection,
};
use serde_json::json;

/// Replays queued responses per URL and keeps every request it was sent
#[derive(Default)]
struct Replay {
    queued: RefCell<HashMap<String, VecDeque<HttpResponse>>>,
    sent: RefCell<Vec<(String, RequestParams)>>,
}

impl Replay {
    fn push(&self, url: &str, response: HttpResponse) {
        self.queued
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    fn requests_to(&self, url: &str) -> Vec<RequestParams> {
        self.sent
            .borrow()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn request_count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Transport for Replay {
    fn get(&self, url: &str, params: &RequestParams) -> mapview::Result<HttpResponse> {
        self.sent.borrow_mut().push((url.to_string(), params.clone()));
        self.queued
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| MapError::Status {
                status: 503,
                reason: format!("nothing queued for {url}"),
            })
    }
}

fn json_ok(value: &serde_json::Value) -> HttpResponse {
    HttpResponse::new(200, "OK", value.to_string().into_bytes())
}

fn image_ok(bytes: &[u8]) -> HttpResponse {
    HttpResponse::new(200, "OK", bytes.to_vec())
}

/// Integration tests driving the controller the way the viewer window does
#[cfg(test)]
mod viewer_scenarios {
    use super::*;

    const MAP: &str = "http://static-maps.test/1.x/";
    const GEO: &str = "http://geocode.test/1.x/";
    const SEARCH: &str = "http://search.test/v1/";

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn config() -> ViewerConfig {
        let mut config = ViewerConfig::default();
        config.services.static_map = ServiceEndpoint::new(MAP, None);
        config.services.geocoder = ServiceEndpoint::new(GEO, Some("geo-key".to_string()));
        config.services.search = ServiceEndpoint::new(SEARCH, Some("search-key".to_string()));
        config
    }

    fn viewer() -> ViewController<Replay> {
        init_logging();
        let transport = Replay::default();
        transport.push(MAP, image_ok(b"initial"));
        ViewController::new(config(), transport).expect("initial fetch")
    }

    fn toponym(text: &str, postal_code: Option<&str>, pos: &str) -> serde_json::Value {
        let mut address = json!({ "formatted": text, "Components": [] });
        if let Some(code) = postal_code {
            address["postal_code"] = json!(code);
        }
        json!({
            "response": { "GeoObjectCollection": { "featureMember": [{
                "GeoObject": {
                    "metaDataProperty": { "GeocoderMetaData": { "text": text, "Address": address } },
                    "Point": { "pos": pos }
                }
            }] } }
        })
    }

    fn nothing() -> serde_json::Value {
        json!({ "response": { "GeoObjectCollection": { "featureMember": [] } } })
    }

    #[test]
    fn test_click_offset_scenario() {
        let mut viewer = viewer();
        viewer.transport().push(GEO, json_ok(&toponym("Москва", None, "37.7 55.8")));
        viewer.transport().push(MAP, image_ok(b"marked"));

        // Viewport 600x450 drawn at a 10px margin: center pixel is (310, 235)
        let outcome = viewer.dispatch(Action::PlaceMarker { x: 350, y: 215 });
        assert!(matches!(outcome, Outcome::Redrawn));

        let marker = viewer.state().marker().unwrap();
        assert_eq!(marker.longitude, 37.617644 + 40.0 * 1.0 / 360.0);
        assert_eq!(marker.latitude, 55.755819 + 20.0 * 1.0 / 360.0);
        // Placing a marker does not move the view
        assert_eq!(viewer.state().center(), Coordinate::new(37.617644, 55.755819));
    }

    #[test]
    fn test_keyboard_session() {
        let mut viewer = viewer();
        let handler = InputHandler::new();
        for _ in 0..3 {
            viewer.transport().push(MAP, image_ok(b"next"));
        }

        let key = |key| InputEvent::KeyPress { key };
        assert!(matches!(
            viewer.handle_event(&handler, &key(KeyCode::PageDown)),
            Outcome::Redrawn
        ));
        assert_eq!(viewer.state().zoom_span(), 0.5);

        assert!(matches!(
            viewer.handle_event(&handler, &key(KeyCode::ArrowRight)),
            Outcome::Redrawn
        ));
        assert_eq!(viewer.state().center().longitude, 37.617644 + 0.5);

        assert!(matches!(
            viewer.handle_event(&handler, &key(KeyCode::PageUp)),
            Outcome::Redrawn
        ));
        assert_eq!(viewer.state().zoom_span(), 1.0);

        assert!(matches!(
            viewer.handle_event(&handler, &key(KeyCode::Other(7))),
            Outcome::Ignored
        ));

        let spans: Vec<_> = viewer
            .transport()
            .requests_to(MAP)
            .iter()
            .map(|params| params.get("spn").unwrap_or_default().to_string())
            .collect();
        assert_eq!(spans, ["1,1", "0.5,0.5", "0.5,0.5", "1,1"]);
        assert_eq!(viewer.image_generation(), 4);
    }

    #[test]
    fn test_repeated_zoom_in_stops_at_bound() {
        init_logging();
        let transport = Replay::default();
        transport.push(MAP, image_ok(b"initial"));
        let config = config().with_zoom_span(0.03125);
        let mut viewer = ViewController::new(config, transport).unwrap();

        for _ in 0..4 {
            assert!(matches!(
                viewer.dispatch(Action::Zoom(ZoomDirection::In)),
                Outcome::Unchanged
            ));
        }
        assert_eq!(viewer.state().zoom_span(), 0.03125);
        assert_eq!(viewer.transport().request_count(), 1);
    }

    #[test]
    fn test_search_nothing_found_scenario() {
        let mut viewer = viewer();
        viewer.transport().push(GEO, json_ok(&toponym("Казань", Some("420000"), "49.1 55.8")));
        viewer.transport().push(MAP, image_ok(b"kazan"));
        viewer.dispatch(Action::Search("Казань".into()));

        let state = viewer.state().clone();
        let text = viewer.text().to_string();
        let generation = viewer.image_generation();

        viewer.transport().push(GEO, json_ok(&nothing()));
        let outcome = viewer.dispatch(Action::Search("Эльдорадо".into()));

        assert!(matches!(outcome, Outcome::NothingFound));
        assert_eq!(viewer.state(), &state);
        assert_eq!(viewer.text(), text);
        assert_eq!(viewer.image_generation(), generation);
        assert_eq!(viewer.status(), Some("Nothing found"));
    }

    #[test]
    fn test_postal_code_toggle_is_offline() {
        let mut viewer = viewer();
        viewer.transport().push(GEO, json_ok(&toponym(
            "Россия, Москва, улица Арбат, 1",
            Some("119019"),
            "37.598 55.752",
        )));
        viewer.transport().push(MAP, image_ok(b"arbat"));
        viewer.dispatch(Action::Search("Арбат 1".into()));
        let requests = viewer.transport().request_count();

        viewer.dispatch(Action::SetShowPostalCode(true));
        assert_eq!(viewer.text(), "119019 Россия, Москва, улица Арбат, 1");
        viewer.dispatch(Action::SetShowPostalCode(false));
        assert_eq!(viewer.text(), "Россия, Москва, улица Арбат, 1");
        viewer.dispatch(Action::SetShowPostalCode(true));
        assert_eq!(viewer.text(), "119019 Россия, Москва, улица Арбат, 1");

        assert_eq!(viewer.transport().request_count(), requests);
    }

    #[test]
    fn test_postal_code_applies_to_next_lookup() {
        let mut viewer = viewer();
        viewer.dispatch(Action::SetShowPostalCode(true));
        assert_eq!(viewer.text(), "");

        viewer.transport().push(GEO, json_ok(&toponym("Тверь", Some("170100"), "35.9 56.86")));
        viewer.transport().push(MAP, image_ok(b"tver"));
        viewer.dispatch(Action::Search("Тверь".into()));
        assert_eq!(viewer.text(), "170100 Тверь");
    }

    #[test]
    fn test_organization_lookup_without_toponym() {
        let mut viewer = viewer();
        viewer.transport().push(GEO, json_ok(&nothing()));

        let outcome = viewer.handle_event(
            &InputHandler::new(),
            &InputEvent::Click {
                x: 300,
                y: 200,
                button: MouseButton::Right,
            },
        );
        assert!(matches!(outcome, Outcome::NothingFound));
        assert!(viewer.transport().requests_to(SEARCH).is_empty());
        assert_eq!(viewer.transport().requests_to(MAP).len(), 1);
    }

    #[test]
    fn test_map_failure_keeps_previous_image() {
        let mut viewer = viewer();
        viewer
            .transport()
            .push(MAP, HttpResponse::new(503, "Service Unavailable", Vec::new()));

        let outcome = viewer.dispatch(Action::Move(Direction::Up));
        assert!(outcome.is_failure());
        assert_eq!(viewer.image().unwrap().bytes(), b"initial");

        // The viewer stays usable for the next action
        viewer.transport().push(MAP, image_ok(b"sat"));
        assert!(matches!(
            viewer.dispatch(Action::SetLayer(Layer::Satellite)),
            Outcome::Redrawn
        ));
        assert_eq!(viewer.image().unwrap().bytes(), b"sat");
        assert_eq!(viewer.status(), None);
    }
}
