use serde::Serialize;

/// A top-level navigation entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub name: &'static str,
    pub url: &'static str,
    pub prefetch: bool,
}

/// Feature flags that toggle optional navigation entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavFlags {
    pub show_luti: bool,
    pub scrims_enabled: bool,
}

const fn item(name: &'static str, url: &'static str, prefetch: bool) -> NavItem {
    NavItem {
        name,
        url,
        prefetch,
    }
}

/// Returns the navigation entries in display order
///
/// # Example
/// ```
/// use turfhub_api::domain::navigation::{nav_items, NavFlags};
///
/// let items = nav_items(NavFlags::default());
/// assert_eq!(items[0].name, "settings");
/// assert!(items.iter().all(|i| i.name != "luti"));
/// ```
pub fn nav_items(flags: NavFlags) -> Vec<NavItem> {
    [
        Some(item("settings", "settings", true)),
        flags.show_luti.then(|| item("luti", "luti", false)),
        Some(item("sendouq", "q", false)),
        Some(item("analyzer", "analyzer", true)),
        Some(item("builds", "builds", true)),
        Some(item(
            "object-damage-calculator",
            "object-damage-calculator",
            true,
        )),
        Some(item("leaderboards", "leaderboards", false)),
        flags.scrims_enabled.then(|| item("scrims", "scrims", false)),
        Some(item("lfg", "lfg", false)),
        Some(item("plans", "plans", false)),
        Some(item("badges", "badges", false)),
        Some(item("calendar", "calendar", false)),
        Some(item("plus", "plus/suggestions", false)),
        Some(item("u", "u", false)),
        Some(item("xsearch", "xsearch", false)),
        Some(item("articles", "a", false)),
        Some(item("vods", "vods", false)),
        Some(item("art", "art", false)),
        Some(item("t", "t", false)),
        Some(item("links", "links", true)),
        Some(item("maps", "maps", false)),
    ]
    .into_iter()
    .flatten()
    .collect()
}
