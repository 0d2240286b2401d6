use clap::ValueEnum;

use crate::page::Page;
use crate::store::PrefStore;

/// Storage key the preference lives under.
pub const STORAGE_KEY: &str = "theme";

pub const SWITCH_TO_LIGHT: &str = "Switch to light theme";
pub const SWITCH_TO_DARK: &str = "Switch to dark theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Accepts only the two supported stored values. Legacy `auto` and
    /// anything else is rejected here and handled by [`normalize`].
    pub fn from_stored(raw: &str) -> Option<Theme> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    /// Two-state flip over the document attribute: exactly `dark` goes to
    /// light, everything else (light, unrecognized, absent) goes to dark.
    pub fn flip_from(current: Option<&str>) -> Theme {
        if current == Some("dark") {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    /// Toggle label when this theme is the currently applied one.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => SWITCH_TO_LIGHT,
            Theme::Light => SWITCH_TO_DARK,
        }
    }
}

/// Label for an arbitrary current attribute value: only exactly `dark`
/// offers the switch to light.
pub fn label_for_attribute(current: Option<&str>) -> &'static str {
    if current == Some("dark") {
        SWITCH_TO_LIGHT
    } else {
        SWITCH_TO_DARK
    }
}

/// Normalize the persisted preference down to the two supported values.
///
/// One read, at most one write. A failed read counts as "no saved value";
/// a failed write-back is discarded so the resolved theme still applies.
pub fn normalize(store: &dyn PrefStore, default: Theme) -> Theme {
    let saved = store.get(STORAGE_KEY).ok().flatten();
    match saved.as_deref().and_then(Theme::from_stored) {
        Some(theme) => theme,
        None => {
            // Covers legacy "auto", garbage, and missing values alike.
            let _ = store.set(STORAGE_KEY, default.as_str());
            default
        }
    }
}

/// One toggle activation: flip from the page's current attribute, apply the
/// result, persist it, and resync the control's labels.
pub fn activate_toggle(page: &Page, store: &dyn PrefStore) -> Theme {
    let next = Theme::flip_from(page.theme_attribute().as_deref());
    page.set_theme_attribute(next);
    let _ = store.set(STORAGE_KEY, next.as_str());
    page.set_toggle_labels(next.toggle_label());
    next
}

/// Recompute the toggle labels from the page's current attribute without
/// flipping anything. Run once after stamping so the labels are correct
/// before any activation.
pub fn sync_toggle_labels(page: &Page) {
    let current = page.theme_attribute();
    page.set_toggle_labels(label_for_attribute(current.as_deref()));
}
