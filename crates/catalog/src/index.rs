use std::sync::Arc;

use formats::SurveyPoint;
use foundation::bounds::GeoBounds;
use parking_lot::RwLock;
use tracing::info;

use crate::error::DataLoadError;
use crate::load::{DatasetSummary, LoadedDataset, load};
use crate::source::DataSource;

pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Immutable point set with precomputed lowercase search keys.
///
/// Ordering contract:
/// - `points()` is in source order.
/// - Duplicate cell ids are kept; lookups resolve to the first occurrence.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    points: Vec<SurveyPoint>,
    keys: Vec<SearchKey>,
    content_hash: Option<String>,
    generation: u64,
}

#[derive(Debug)]
struct SearchKey {
    cell_id: String,
    display_name: Option<String>,
}

impl IndexSnapshot {
    fn new(points: Vec<SurveyPoint>, content_hash: Option<String>, generation: u64) -> Self {
        let keys = points
            .iter()
            .map(|p| SearchKey {
                cell_id: p.cell_id.to_lowercase(),
                display_name: p.display_name.as_deref().map(str::to_lowercase),
            })
            .collect();
        Self {
            points,
            keys,
            content_hash,
            generation,
        }
    }

    pub fn points(&self) -> &[SurveyPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    /// Incremented by every `replace`; 0 means nothing was ever loaded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Case-insensitive equality on the cell id; first match in source order.
    pub fn find_exact(&self, cell_id: &str) -> Option<&SurveyPoint> {
        let needle = cell_id.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.keys
            .iter()
            .position(|k| k.cell_id == needle)
            .map(|i| &self.points[i])
    }

    /// Cell ids whose cell id or display name contains `query`
    /// (case-insensitive), sorted ascending, at most `limit` entries.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut out: Vec<String> = self
            .keys
            .iter()
            .zip(&self.points)
            .filter(|(k, _)| {
                k.cell_id.contains(&needle)
                    || k.display_name.as_deref().is_some_and(|n| n.contains(&needle))
            })
            .map(|(_, p)| p.cell_id.clone())
            .collect();
        out.sort();
        out.truncate(limit);
        out
    }

    pub fn points_within(&self, bounds: &GeoBounds) -> Vec<&SurveyPoint> {
        self.points
            .iter()
            .filter(|p| bounds.contains(p.position()))
            .collect()
    }
}

/// Shared handle to the current point set.
///
/// Cloning is cheap and every clone sees the same index. A load swaps the
/// whole snapshot at once: readers holding an older [`Arc<IndexSnapshot>`]
/// keep a consistent view and never observe a mix of two datasets.
#[derive(Debug, Clone, Default)]
pub struct PointIndex {
    current: Arc<RwLock<Arc<IndexSnapshot>>>,
}

impl PointIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<SurveyPoint>) -> Self {
        let index = Self::new();
        index.replace(points, None);
        index
    }

    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    /// Swap in a new point set. Returns the new generation.
    pub fn replace(&self, points: Vec<SurveyPoint>, content_hash: Option<String>) -> u64 {
        let mut guard = self.current.write();
        let generation = guard.generation + 1;
        *guard = Arc::new(IndexSnapshot::new(points, content_hash, generation));
        generation
    }

    pub fn install(&self, dataset: LoadedDataset) -> u64 {
        self.replace(dataset.points, Some(dataset.content_hash))
    }

    /// Load `source` and replace the index with it.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self, source: &dyn DataSource) -> Result<DatasetSummary, DataLoadError> {
        let dataset = load(source).await?;
        let summary = dataset.summary();
        let unchanged = self.snapshot().content_hash() == Some(summary.content_hash.as_str());
        let generation = self.install(dataset);
        if unchanged {
            info!("dataset {} unchanged (generation {generation})", source.name());
        }
        Ok(summary)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn find_exact(&self, cell_id: &str) -> Option<SurveyPoint> {
        self.snapshot().find_exact(cell_id).cloned()
    }

    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        self.snapshot().suggest(query, limit)
    }

    pub fn points_within(&self, bounds: &GeoBounds) -> Vec<SurveyPoint> {
        self.snapshot()
            .points_within(bounds)
            .into_iter()
            .cloned()
            .collect()
    }
}
