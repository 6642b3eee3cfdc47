use tracing::{debug, warn};
use url::Url;

use crate::codec::{decode_cell_id, decode_fragment, encode_cell_id, encode_position};
use crate::location::{LocationError, LocationPort};
use crate::state::{MapPosition, PartialViewState, ViewState};

/// Authoritative view state mirrored into the page URL.
///
/// `current` always reflects the last parse or successful write. The URL is
/// last-writer-wins: viewport updates and search results may interleave and
/// there is no locking between them.
#[derive(Debug)]
pub struct ViewStateStore<L: LocationPort> {
    location: L,
    current: PartialViewState,
}

impl<L: LocationPort> ViewStateStore<L> {
    /// Create a store and parse the initial URL.
    pub fn new(location: L) -> Self {
        let mut store = Self {
            location,
            current: PartialViewState::default(),
        };
        store.parse();
        store
    }

    pub fn current(&self) -> &PartialViewState {
        &self.current
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Re-read the URL. Never fails: unreadable or foreign URLs yield an
    /// empty state.
    pub fn parse(&mut self) -> PartialViewState {
        let parsed = match self.read_url() {
            Ok(url) => {
                let mut state = decode_fragment(url.fragment().unwrap_or(""));
                state.cell_id = decode_cell_id(url.query().unwrap_or(""));
                state
            }
            Err(err) => {
                warn!("cannot read view state from location: {err}");
                PartialViewState::default()
            }
        };
        self.current = parsed.clone();
        parsed
    }

    /// Merge `partial` into the URL.
    ///
    /// A position rewrites the fragment (always in compact form). A cell id
    /// sets `id`, an empty one removes it. Absent fields leave the URL alone.
    ///
    /// Positions are normalized first (longitude wrapped, latitude clamped) so
    /// every written fragment decodes again; non-finite positions are dropped.
    pub fn update(&mut self, partial: &PartialViewState) -> Result<(), LocationError> {
        let mut partial = partial.clone();
        if let Some(position) = partial.position {
            partial.position = normalize_position(position);
        }
        if partial.is_empty() {
            return Ok(());
        }

        let mut url = self.read_url()?;
        if let Some(position) = &partial.position {
            url.set_fragment(Some(&encode_position(position)));
        }
        if let Some(cell_id) = partial.cell_id.as_deref() {
            encode_cell_id(&mut url, Some(cell_id));
        }

        self.write_url(&url)?;
        self.current = self.current.merged(&partial);
        Ok(())
    }

    /// Canonical link for `state`: origin and path of the current page with a
    /// fresh fragment and `id`; any other query or fragment is dropped.
    pub fn build_share_url(&self, state: &ViewState) -> Result<String, LocationError> {
        let mut url = self.read_url()?;
        url.set_query(None);
        let fragment = normalize_position(state.position).map(|p| encode_position(&p));
        url.set_fragment(fragment.as_deref());
        encode_cell_id(&mut url, state.cell_id.as_deref());
        Ok(url.to_string())
    }

    /// Drop fragment and query, leaving origin and path.
    pub fn clear(&mut self) -> Result<(), LocationError> {
        let mut url = self.read_url()?;
        url.set_query(None);
        url.set_fragment(None);
        self.write_url(&url)?;
        self.current = PartialViewState::default();
        Ok(())
    }

    fn read_url(&self) -> Result<Url, LocationError> {
        let href = self.location.href()?;
        Url::parse(&href).map_err(|e| LocationError::InvalidUrl(format!("{href}: {e}")))
    }

    fn write_url(&mut self, url: &Url) -> Result<(), LocationError> {
        let href = self.location.href()?;
        if href == url.as_str() {
            return Ok(());
        }
        debug!("replacing location with {url}");
        self.location.replace(url.as_str()).inspect_err(|err| {
            warn!("failed to replace location: {err}");
        })
    }
}

fn normalize_position(position: MapPosition) -> Option<MapPosition> {
    match position.center.normalized() {
        Some(center) => Some(MapPosition { center, ..position }),
        None => {
            warn!("ignoring non-finite map position {:?}", position.center);
            None
        }
    }
}
