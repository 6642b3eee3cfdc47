use foundation::geo::LatLng;

/// Map viewport: integer zoom plus center.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapPosition {
    pub zoom: u8,
    pub center: LatLng,
}

impl MapPosition {
    pub fn new(zoom: u8, lat: f64, lng: f64) -> Self {
        Self {
            zoom,
            center: LatLng::new(lat, lng),
        }
    }
}

/// A complete, shareable view.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub position: MapPosition,
    pub cell_id: Option<String>,
}

/// A view with any subset of fields known.
///
/// Zoom, lat and lng travel together in [`MapPosition`], so a position is
/// either fully present or absent.
///
/// As an update, `cell_id: Some("")` means "remove the selection" while
/// `None` leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialViewState {
    pub position: Option<MapPosition>,
    pub cell_id: Option<String>,
}

impl PartialViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: MapPosition) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_cell_id(mut self, cell_id: impl Into<String>) -> Self {
        self.cell_id = Some(cell_id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.cell_id.is_none()
    }

    /// Apply `update` on top of `self` with URL update semantics.
    pub fn merged(&self, update: &PartialViewState) -> PartialViewState {
        let cell_id = match update.cell_id.as_deref() {
            None => self.cell_id.clone(),
            Some(id) if id.trim().is_empty() => None,
            Some(id) => Some(id.trim().to_string()),
        };
        PartialViewState {
            position: update.position.or(self.position),
            cell_id,
        }
    }

    pub fn to_view_state(&self) -> Option<ViewState> {
        Some(ViewState {
            position: self.position?,
            cell_id: self.cell_id.clone(),
        })
    }
}

impl From<ViewState> for PartialViewState {
    fn from(state: ViewState) -> Self {
        PartialViewState {
            position: Some(state.position),
            cell_id: state.cell_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MapPosition, PartialViewState};
    use pretty_assertions::assert_eq;

    #[test]
    fn merge_keeps_absent_fields_and_clears_on_empty_cell() {
        let base = PartialViewState::new()
            .with_position(MapPosition::new(10, 1.0, 2.0))
            .with_cell_id("A23");

        let moved = base.merged(&PartialViewState::new().with_position(MapPosition::new(12, 3.0, 4.0)));
        assert_eq!(moved.cell_id.as_deref(), Some("A23"));
        assert_eq!(moved.position, Some(MapPosition::new(12, 3.0, 4.0)));

        let cleared = moved.merged(&PartialViewState::new().with_cell_id(""));
        assert_eq!(cleared.cell_id, None);
        assert_eq!(cleared.position, moved.position);
    }

    #[test]
    fn view_state_requires_position() {
        assert!(PartialViewState::new().with_cell_id("A1").to_view_state().is_none());
        let full = PartialViewState::new()
            .with_position(MapPosition::new(3, 0.0, 0.0))
            .to_view_state()
            .expect("complete");
        assert_eq!(full.cell_id, None);
    }
}
