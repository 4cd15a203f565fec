use strum::Display;

use crate::windowing::AppId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayWindowState {
    pub app_id: AppId,
    /// Hidden, but still open. Shown in the dock.
    pub minimized: bool,
}

impl OverlayWindowState {
    pub const fn new(app_id: AppId) -> Self {
        Self {
            app_id,
            minimized: false,
        }
    }
}

/// Where a window sits in its lifecycle.
///
/// `Closed` is not stored anywhere; it is the absence of an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum WindowPhase {
    Closed,
    /// Topmost visible window; receives input.
    Focused,
    /// Visible, but stacked below the focused window.
    Background,
    Minimized,
}

impl WindowPhase {
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WindowEvent {
    Opened(AppId),
    Restored(AppId),
    Focused(AppId),
    Minimized(AppId),
    Closed(AppId),
}

impl WindowEvent {
    pub const fn app_id(&self) -> &AppId {
        match self {
            Self::Opened(id)
            | Self::Restored(id)
            | Self::Focused(id)
            | Self::Minimized(id)
            | Self::Closed(id) => id,
        }
    }
}
