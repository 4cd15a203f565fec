//! Read-side views over the window manager, resolved against the app registry.
//!
//! Windows whose id has no registry entry are skipped here; the manager itself
//! accepts any id.

use crate::windowing::{
    manager::OverlayWindowManager,
    registry::{AppDefinition, AppRegistry},
    window::WindowPhase,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEntry<'a> {
    pub definition: &'a AppDefinition,
    /// Index in the full z-order, 0 is the bottom.
    pub z: usize,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherEntry<'a> {
    pub definition: &'a AppDefinition,
    pub phase: WindowPhase,
}

/// Visible windows to draw, bottom to top.
pub fn visible_windows<'a>(
    manager: &OverlayWindowManager,
    registry: &'a AppRegistry,
) -> Vec<SurfaceEntry<'a>> {
    let focused = manager.focused();
    manager
        .windows()
        .iter()
        .enumerate()
        .filter(|(_, w)| !w.minimized)
        .filter_map(|(z, w)| {
            let Some(definition) = registry.get(w.app_id.as_str()) else {
                log::debug!("{}: no such app, not drawing", w.app_id);
                return None;
            };
            Some(SurfaceEntry {
                definition,
                z,
                focused: focused == Some(&w.app_id),
            })
        })
        .collect()
}

/// Minimized windows for the dock, bottom to top.
pub fn dock_entries<'a>(
    manager: &OverlayWindowManager,
    registry: &'a AppRegistry,
) -> Vec<&'a AppDefinition> {
    manager
        .minimized_apps()
        .filter_map(|id| registry.get(id.as_str()))
        .collect()
}

/// Every registered app with its current window phase, in registry order.
pub fn launcher_entries<'a>(
    manager: &OverlayWindowManager,
    registry: &'a AppRegistry,
) -> Vec<LauncherEntry<'a>> {
    registry
        .iter()
        .map(|definition| LauncherEntry {
            definition,
            phase: manager.phase(definition.id.as_str()),
        })
        .collect()
}
