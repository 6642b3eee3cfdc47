#![allow(dead_code)]

use foundation::geo::{LatLng, clamp_zoom};
use navigator::{HighlightHandle, MapWidget, MoveOptions, Subscription, Viewport, ViewportHandler};
use runtime::event_bus::EventBus;

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCall {
    MoveTo {
        center: LatLng,
        zoom: u8,
        animated: bool,
    },
    ShowHighlight(HighlightHandle),
    RemoveHighlight(HighlightHandle),
}

/// Map double that records what the navigator asked for and lets tests play
/// the user by emitting viewport changes.
#[derive(Debug, Default)]
pub struct RecordingWidget {
    pub calls: Vec<WidgetCall>,
    pub zoom: u8,
    next_handle: u64,
    shown: Vec<HighlightHandle>,
    viewport: EventBus<Viewport>,
}

impl RecordingWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user panning or zooming.
    pub fn user_moves(&mut self, lat: f64, lng: f64, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
        self.viewport.emit(&Viewport {
            center: LatLng::new(lat, lng),
            zoom,
        });
    }

    pub fn visible_highlights(&self) -> &[HighlightHandle] {
        &self.shown
    }

    pub fn listeners(&self) -> usize {
        self.viewport.len()
    }

    pub fn moves(&self) -> Vec<&WidgetCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::MoveTo { .. }))
            .collect()
    }
}

impl MapWidget for RecordingWidget {
    fn move_to(&mut self, center: LatLng, zoom: u8, options: MoveOptions) {
        self.calls.push(WidgetCall::MoveTo {
            center,
            zoom,
            animated: options.animated,
        });
        self.zoom = zoom;
        self.viewport.emit(&Viewport {
            center,
            zoom: f64::from(zoom),
        });
    }

    fn show_highlight_at(&mut self, _center: LatLng) -> HighlightHandle {
        self.next_handle += 1;
        let handle = HighlightHandle(self.next_handle);
        self.shown.push(handle);
        self.calls.push(WidgetCall::ShowHighlight(handle));
        handle
    }

    fn remove_highlight(&mut self, handle: HighlightHandle) {
        self.shown.retain(|h| *h != handle);
        self.calls.push(WidgetCall::RemoveHighlight(handle));
    }

    fn on_viewport_change(&mut self, mut handler: ViewportHandler) -> Subscription {
        self.viewport.subscribe(move |v: &Viewport| handler(*v))
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.viewport.unsubscribe(subscription)
    }

    fn current_zoom(&self) -> u8 {
        self.zoom
    }
}

pub const GEOJSON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "properties": {"cell_id": "B2"},
     "geometry": {"type": "Point", "coordinates": [-74.0, 40.0]}},
    {"type": "Feature", "properties": {"cell_id": "A23", "name": "Harbor"},
     "geometry": {"type": "Point", "coordinates": [-74.006, 40.7128]}},
    {"type": "Feature", "properties": {"cell_id": "A1"},
     "geometry": {"type": "Point", "coordinates": [-73.5, 41.0]}}
  ]
}"#;
