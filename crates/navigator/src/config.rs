use std::env;
use std::str::FromStr;

use foundation::geo::MAX_ZOOM;
use serde::Deserialize;

/// Tunables for search and highlight behaviour.
///
/// Every source (defaults, JSON, `SURVEY_*` environment) goes through
/// [`NavigatorConfig::clamped`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Zoom applied when flying to a found cell.
    pub focus_zoom: u8,
    /// Seconds between starting the fly animation and showing the highlight.
    pub fly_duration_s: f64,
    /// Seconds a highlight stays on the map.
    pub highlight_duration_s: f64,
    /// Below this zoom no points are drawn.
    pub min_visible_zoom: u8,
    pub suggestion_limit: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            focus_zoom: 16,
            fly_duration_s: 1.5,
            highlight_duration_s: 3.0,
            min_visible_zoom: 12,
            suggestion_limit: catalog::DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl NavigatorConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(text).map(Self::clamped)
    }

    /// Defaults overlaid with `SURVEY_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Overlay values from `lookup`. Missing or unparsable keys keep the
    /// current value.
    pub fn with_overrides(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            focus_zoom: var_or(&lookup, "SURVEY_FOCUS_ZOOM", self.focus_zoom),
            fly_duration_s: var_or(&lookup, "SURVEY_FLY_DURATION_S", self.fly_duration_s),
            highlight_duration_s: var_or(
                &lookup,
                "SURVEY_HIGHLIGHT_DURATION_S",
                self.highlight_duration_s,
            ),
            min_visible_zoom: var_or(&lookup, "SURVEY_MIN_VISIBLE_ZOOM", self.min_visible_zoom),
            suggestion_limit: var_or(&lookup, "SURVEY_SUGGESTION_LIMIT", self.suggestion_limit),
        }
        .clamped()
    }

    pub fn clamped(self) -> Self {
        Self {
            focus_zoom: self.focus_zoom.min(MAX_ZOOM),
            fly_duration_s: non_negative(self.fly_duration_s),
            highlight_duration_s: non_negative(self.highlight_duration_s),
            min_visible_zoom: self.min_visible_zoom.min(MAX_ZOOM),
            suggestion_limit: self.suggestion_limit.max(1),
        }
    }
}

fn var_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_negative(secs: f64) -> f64 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}
