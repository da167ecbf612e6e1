use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PREFERENCES_KEY;
use crate::signup::store::{JsonStore, KeyValueStore};

pub const TRACKED_SECTIONS: &[&str] = &["home", "features", "pricing", "faq", "contact"];

/// Written when the visitor leaves the page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPreferences {
    pub last_visit: DateTime<Utc>,
    pub viewed_sections: Vec<String>,
}

pub fn load_preferences<S: KeyValueStore>(store: &JsonStore<S>) -> Option<VisitorPreferences> {
    store.get(PREFERENCES_KEY)
}

pub fn save_preferences<S: KeyValueStore>(
    store: &mut JsonStore<S>,
    viewed_sections: Vec<String>,
    now: DateTime<Utc>,
) -> VisitorPreferences {
    let preferences = VisitorPreferences {
        last_visit: now,
        viewed_sections,
    };
    store.set(PREFERENCES_KEY, &preferences);
    preferences
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

/// Whether `bounds` sits entirely inside a viewport of the given size.
pub fn fully_visible(bounds: Bounds, viewport_width: f64, viewport_height: f64) -> bool {
    bounds.top >= 0.0
        && bounds.left >= 0.0
        && bounds.bottom <= viewport_height
        && bounds.right <= viewport_width
}

/// Ids of the tracked sections currently on screen.
pub fn visible_sections() -> Vec<String> {
    let Some(window) = web_sys::window() else {
        return Vec::new();
    };
    let Some(document) = window.document() else {
        return Vec::new();
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);

    TRACKED_SECTIONS
        .iter()
        .filter(|id| {
            document.get_element_by_id(id).map_or(false, |element| {
                let rect = element.get_bounding_client_rect();
                fully_visible(
                    Bounds {
                        top: rect.top(),
                        left: rect.left(),
                        bottom: rect.bottom(),
                        right: rect.right(),
                    },
                    width,
                    height,
                )
            })
        })
        .map(|id| id.to_string())
        .collect()
}
