//! Contract for the interactive map the navigator drives.

use foundation::geo::LatLng;
pub use runtime::event_bus::Subscription;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HighlightHandle(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct MoveOptions {
    pub animated: bool,
}

/// Viewport reported by the widget after the user pans or zooms.
///
/// Zoom may be fractional while animating; it is rounded when written to the
/// URL.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

pub type ViewportHandler = Box<dyn FnMut(Viewport)>;

pub trait MapWidget {
    fn move_to(&mut self, center: LatLng, zoom: u8, options: MoveOptions);

    /// Draw a transient marker. The widget owns the handle namespace.
    fn show_highlight_at(&mut self, center: LatLng) -> HighlightHandle;

    fn remove_highlight(&mut self, handle: HighlightHandle);

    fn on_viewport_change(&mut self, handler: ViewportHandler) -> Subscription;

    /// Returns false if `subscription` was not registered.
    fn unsubscribe(&mut self, subscription: Subscription) -> bool;

    fn current_zoom(&self) -> u8;
}
