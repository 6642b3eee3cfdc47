//! Search and navigation over the survey point index.
//!
//! The navigator is driven by a single-threaded host loop:
//! - widget viewport callbacks only queue events; [`Navigator::tick`] writes
//!   the latest one to the URL,
//! - highlights are timer tasks (show after the fly animation, remove after
//!   the highlight duration) fired by `tick`,
//! - dataset loads are async and swap the index atomically.

use std::collections::BTreeMap;

use catalog::{DataLoadError, DataSource, DatasetSummary, PointIndex, SurveyPoint};
use foundation::bounds::GeoBounds;
use foundation::geo::{LatLng, clamp_zoom};
use foundation::time::Time;
use runtime::mailbox::Mailbox;
use runtime::timers::{TimerId, TimerQueue};
use tracing::{debug, info, warn};
use viewstate::{LocationError, LocationPort, MapPosition, PartialViewState, ViewStateStore};

use crate::config::NavigatorConfig;
use crate::widget::{HighlightHandle, MapWidget, MoveOptions, Subscription, Viewport};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchId(pub u64);

/// Cancellable handle for one search's highlight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightId(pub u64);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Searching {
        search_id: SearchId,
        query: String,
    },
    Found {
        search_id: SearchId,
        cell_id: String,
    },
    NotFound {
        search_id: SearchId,
        query: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found {
        search_id: SearchId,
        point: SurveyPoint,
        highlight: HighlightId,
    },
    NotFound {
        search_id: SearchId,
        query: String,
        message: String,
    },
    /// Blank query; nothing happened.
    Ignored,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Result of [`Navigator::load_dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub summary: DatasetSummary,
    /// Search run for a cell id that arrived in the URL before the data.
    pub pending: Option<SearchOutcome>,
}

#[derive(Debug, Copy, Clone)]
enum HighlightTask {
    Show {
        highlight: HighlightId,
        center: LatLng,
        at: Time,
    },
    Remove { highlight: HighlightId },
}

#[derive(Debug)]
struct HighlightSlot {
    timer: TimerId,
    shown: Option<HighlightHandle>,
}

pub struct Navigator<L: LocationPort, W: MapWidget> {
    config: NavigatorConfig,
    index: PointIndex,
    store: ViewStateStore<L>,
    widget: Option<W>,
    subscription: Option<Subscription>,
    viewports: Mailbox<Viewport>,
    timers: TimerQueue<HighlightTask>,
    highlights: BTreeMap<HighlightId, HighlightSlot>,
    state: SearchState,
    pending_cell_id: Option<String>,
    now: Time,
    next_search_id: u64,
    next_highlight_id: u64,
}

impl<L: LocationPort, W: MapWidget> Navigator<L, W> {
    /// Parse the URL and remember its cell id until data is loaded.
    pub fn new(config: NavigatorConfig, index: PointIndex, location: L) -> Self {
        let config = config.clamped();
        let store = ViewStateStore::new(location);
        let pending_cell_id = store.current().cell_id.clone();
        if let Some(id) = &pending_cell_id {
            debug!("cell {id} requested by URL, waiting for data");
        }
        Self {
            config,
            index,
            store,
            widget: None,
            subscription: None,
            viewports: Mailbox::new(),
            timers: TimerQueue::new(),
            highlights: BTreeMap::new(),
            state: SearchState::Idle,
            pending_cell_id,
            now: Time::ZERO,
            next_search_id: 0,
            next_highlight_id: 0,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn index(&self) -> &PointIndex {
        &self.index
    }

    pub fn store(&self) -> &ViewStateStore<L> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ViewStateStore<L> {
        &mut self.store
    }

    pub fn widget(&self) -> Option<&W> {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> Option<&mut W> {
        self.widget.as_mut()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn pending_cell_id(&self) -> Option<&str> {
        self.pending_cell_id.as_deref()
    }

    /// Time of the last [`Navigator::tick`].
    pub fn now(&self) -> Time {
        self.now
    }

    /// Hand the map to the navigator. A position parsed from the URL is
    /// applied immediately, without animation.
    pub fn attach(&mut self, mut widget: W) {
        self.detach();

        if let Some(position) = self.store.current().position {
            widget.move_to(position.center, position.zoom, MoveOptions { animated: false });
        }
        let mailbox = self.viewports.clone();
        let subscription = widget.on_viewport_change(Box::new(move |viewport| mailbox.post(viewport)));
        self.subscription = Some(subscription);
        self.widget = Some(widget);
    }

    /// Unsubscribe and return the widget. Queued viewport events are dropped
    /// and highlights are taken off the widget before it is handed back;
    /// pending ones are cancelled.
    pub fn detach(&mut self) -> Option<W> {
        let mut widget = self.widget.take()?;
        if let Some(sub) = self.subscription.take()
            && !widget.unsubscribe(sub)
        {
            warn!("map widget did not know viewport subscription {}", sub.0);
        }
        self.viewports.drain();

        for (_, slot) in std::mem::take(&mut self.highlights) {
            self.timers.cancel(slot.timer);
            if let Some(handle) = slot.shown {
                widget.remove_highlight(handle);
            }
        }
        Some(widget)
    }

    /// Advance the host clock: write the latest viewport to the URL and run
    /// due highlight tasks.
    pub fn tick(&mut self, now: Time) {
        if now.0 > self.now.0 {
            self.now = now;
        }

        if let Some(viewport) = self.viewports.drain().pop() {
            let position = MapPosition {
                zoom: clamp_zoom(viewport.zoom),
                center: viewport.center,
            };
            if let Err(err) = self.store.update(&PartialViewState::new().with_position(position)) {
                warn!("failed to write viewport to URL: {err}");
            }
        }

        loop {
            let due = self.timers.pop_due(self.now);
            if due.is_empty() {
                break;
            }
            for (_, task) in due {
                self.run_highlight_task(task);
            }
        }
    }

    /// Look up `query` as an exact cell id and fly to it.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SearchOutcome::Ignored;
        }

        self.next_search_id += 1;
        let search_id = SearchId(self.next_search_id);
        self.state = SearchState::Searching {
            search_id,
            query: trimmed.to_string(),
        };

        let Some(point) = self.index.find_exact(trimmed) else {
            let message = format!("Cell \"{trimmed}\" not found");
            info!("search {}: {message}", search_id.0);
            self.state = SearchState::NotFound {
                search_id,
                query: query.to_string(),
                message: message.clone(),
            };
            return SearchOutcome::NotFound {
                search_id,
                query: query.to_string(),
                message,
            };
        };

        let center = point.position();
        let zoom = self.config.focus_zoom;
        if let Some(widget) = self.widget.as_mut() {
            widget.move_to(center, zoom, MoveOptions { animated: true });
        }
        let highlight = self.schedule_highlight(center);

        let update = PartialViewState::new()
            .with_position(MapPosition { zoom, center })
            .with_cell_id(point.cell_id.clone());
        if let Err(err) = self.store.update(&update) {
            warn!("failed to write cell {} to URL: {err}", point.cell_id);
        }

        self.pending_cell_id = None;
        info!("search {}: found cell {}", search_id.0, point.cell_id);
        self.state = SearchState::Found {
            search_id,
            cell_id: point.cell_id.clone(),
        };
        SearchOutcome::Found {
            search_id,
            point,
            highlight,
        }
    }

    pub fn get_suggestions(&self, query: &str) -> Vec<String> {
        self.index.suggest(query, self.config.suggestion_limit)
    }

    /// Replace the index from `source`, then resolve a cell id that came in
    /// with the URL. On failure the previous points stay searchable.
    pub async fn load_dataset(&mut self, source: &dyn DataSource) -> Result<LoadOutcome, DataLoadError> {
        let summary = self.index.refresh(source).await?;
        let pending = match self.pending_cell_id.take() {
            Some(id) => Some(self.search(&id)),
            None => None,
        };
        Ok(LoadOutcome { summary, pending })
    }

    /// Stop a highlight early. Returns false if it already expired.
    pub fn cancel_highlight(&mut self, highlight: HighlightId) -> bool {
        let Some(slot) = self.highlights.remove(&highlight) else {
            return false;
        };
        self.timers.cancel(slot.timer);
        if let Some(handle) = slot.shown
            && let Some(widget) = self.widget.as_mut()
        {
            widget.remove_highlight(handle);
        }
        true
    }

    pub fn active_highlights(&self) -> usize {
        self.highlights.len()
    }

    /// Close the found / not-found notice.
    pub fn dismiss(&mut self) {
        if matches!(
            self.state,
            SearchState::Found { .. } | SearchState::NotFound { .. }
        ) {
            self.state = SearchState::Idle;
        }
    }

    /// Link to the current view, or `None` before any position is known.
    pub fn share_url(&self) -> Result<Option<String>, LocationError> {
        match self.store.current().to_view_state() {
            Some(view) => self.store.build_share_url(&view).map(Some),
            None => Ok(None),
        }
    }

    pub fn clear_selection(&mut self) -> Result<(), LocationError> {
        self.pending_cell_id = None;
        self.store.update(&PartialViewState::new().with_cell_id(""))?;
        self.dismiss();
        Ok(())
    }

    /// Points to draw for the given viewport; none below the minimum visible
    /// zoom.
    pub fn visible_points(&self, zoom: f64, bounds: &GeoBounds) -> Vec<SurveyPoint> {
        if clamp_zoom(zoom) < self.config.min_visible_zoom {
            return Vec::new();
        }
        self.index.points_within(bounds)
    }

    fn schedule_highlight(&mut self, center: LatLng) -> HighlightId {
        self.next_highlight_id += 1;
        let highlight = HighlightId(self.next_highlight_id);
        let at = self.now.after(self.config.fly_duration_s);
        let timer = self.timers.schedule(
            at,
            HighlightTask::Show {
                highlight,
                center,
                at,
            },
        );
        self.highlights
            .insert(highlight, HighlightSlot { timer, shown: None });
        highlight
    }

    fn run_highlight_task(&mut self, task: HighlightTask) {
        match task {
            HighlightTask::Show {
                highlight,
                center,
                at,
            } => {
                let Some(slot) = self.highlights.get_mut(&highlight) else {
                    return;
                };
                slot.shown = self.widget.as_mut().map(|w| w.show_highlight_at(center));
                // Anchored to the show deadline so a late tick does not
                // stretch the highlight.
                slot.timer = self.timers.schedule(
                    at.after(self.config.highlight_duration_s),
                    HighlightTask::Remove { highlight },
                );
            }
            HighlightTask::Remove { highlight } => {
                if let Some(slot) = self.highlights.remove(&highlight)
                    && let Some(handle) = slot.shown
                    && let Some(widget) = self.widget.as_mut()
                {
                    widget.remove_highlight(handle);
                }
            }
        }
    }
}

impl<L: LocationPort, W: MapWidget> Drop for Navigator<L, W> {
    fn drop(&mut self) {
        self.detach();
    }
}
