use crate::windowing::{
    AppId,
    window::{OverlayWindowState, WindowEvent, WindowPhase},
};

pub type WindowObserver = Box<dyn FnMut(&WindowEvent, &[OverlayWindowState])>;

/// Owns the list of open overlay windows.
///
/// The list is the z-order: the last entry is topmost. There is never more
/// than one entry per app id. Operations on ids that are not open are no-ops.
#[derive(Default)]
pub struct OverlayWindowManager {
    windows: Vec<OverlayWindowState>,
    observers: Vec<WindowObserver>,
    revision: u64,
}

impl OverlayWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that runs after every state change.
    pub fn observe(
        &mut self,
        observer: impl FnMut(&WindowEvent, &[OverlayWindowState]) + 'static,
    ) {
        self.observers.push(Box::new(observer));
    }

    /// Bumped on every state change. No-ops leave it untouched.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn open_overlay(&mut self, app_id: impl Into<AppId>) {
        let app_id = app_id.into();

        let Some(idx) = self.position(app_id.as_str()) else {
            log::debug!("{app_id}: opened");
            self.windows.push(OverlayWindowState::new(app_id.clone()));
            self.emit(WindowEvent::Opened(app_id));
            return;
        };

        let was_minimized = self.windows[idx].minimized;
        if !was_minimized && self.is_topmost(idx) {
            return;
        }

        let mut state = self.windows.remove(idx);
        state.minimized = false;
        self.windows.push(state);

        if was_minimized {
            log::debug!("{app_id}: restored");
            self.emit(WindowEvent::Restored(app_id));
        } else {
            log::debug!("{app_id}: raised by open");
            self.emit(WindowEvent::Focused(app_id));
        }
    }

    pub fn close_overlay(&mut self, app_id: &str) {
        let Some(idx) = self.position(app_id) else {
            return;
        };
        let state = self.windows.remove(idx);
        log::debug!("{}: closed", state.app_id);
        self.emit(WindowEvent::Closed(state.app_id));
    }

    /// Hides the window without touching its place in the z-order.
    pub fn minimize_overlay(&mut self, app_id: &str) {
        let Some(state) = self.windows.iter_mut().find(|w| w.app_id.as_str() == app_id) else {
            return;
        };
        if state.minimized {
            return;
        }
        state.minimized = true;
        let app_id = state.app_id.clone();
        log::debug!("{app_id}: minimized");
        self.emit(WindowEvent::Minimized(app_id));
    }

    /// Raises the window to the top. A minimized window stays minimized.
    pub fn focus_overlay(&mut self, app_id: &str) {
        let Some(idx) = self.position(app_id) else {
            return;
        };
        if self.is_topmost(idx) {
            return;
        }
        let state = self.windows.remove(idx);
        let app_id = state.app_id.clone();
        self.windows.push(state);
        log::debug!("{app_id}: focused");
        self.emit(WindowEvent::Focused(app_id));
    }

    /// Taskbar click: restore if minimized, minimize if focused, raise otherwise.
    pub fn toggle_from_dock(&mut self, app_id: &str) {
        match self.phase(app_id) {
            WindowPhase::Closed => {}
            WindowPhase::Minimized => self.open_overlay(app_id),
            WindowPhase::Focused => self.minimize_overlay(app_id),
            WindowPhase::Background => self.focus_overlay(app_id),
        }
    }

    /// All open windows, bottom to top.
    pub fn windows(&self) -> &[OverlayWindowState] {
        &self.windows
    }

    pub fn get(&self, app_id: &str) -> Option<&OverlayWindowState> {
        self.windows.iter().find(|w| w.app_id.as_str() == app_id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The dock view, bottom to top.
    pub fn minimized_apps(&self) -> impl Iterator<Item = &AppId> {
        self.windows
            .iter()
            .filter(|w| w.minimized)
            .map(|w| &w.app_id)
    }

    /// Topmost window that is not minimized.
    pub fn focused(&self) -> Option<&AppId> {
        self.windows
            .iter()
            .rev()
            .find(|w| !w.minimized)
            .map(|w| &w.app_id)
    }

    pub fn phase(&self, app_id: &str) -> WindowPhase {
        match self.get(app_id) {
            None => WindowPhase::Closed,
            Some(w) if w.minimized => WindowPhase::Minimized,
            Some(_) if self.focused().is_some_and(|f| f.as_str() == app_id) => {
                WindowPhase::Focused
            }
            Some(_) => WindowPhase::Background,
        }
    }

    fn position(&self, app_id: &str) -> Option<usize> {
        self.windows.iter().position(|w| w.app_id.as_str() == app_id)
    }

    fn is_topmost(&self, idx: usize) -> bool {
        idx + 1 == self.windows.len()
    }

    fn emit(&mut self, event: WindowEvent) {
        self.revision += 1;
        for observer in &mut self.observers {
            observer(&event, &self.windows);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use proptest::prelude::*;

    use super::*;

    fn ids(manager: &OverlayWindowManager) -> Vec<&str> {
        manager.windows().iter().map(|w| w.app_id.as_str()).collect()
    }

    fn opened(apps: &[&str]) -> OverlayWindowManager {
        let mut manager = OverlayWindowManager::new();
        for app in apps {
            manager.open_overlay(*app);
        }
        manager
    }

    #[test]
    fn repeated_open_keeps_single_entry() {
        let mut manager = OverlayWindowManager::new();
        for _ in 0..5 {
            manager.open_overlay("studio");
        }
        assert_eq!(ids(&manager), ["studio"]);
        assert_eq!(manager.revision(), 1);
    }

    #[test]
    fn open_restores_minimized_window() {
        let mut manager = opened(&["studio"]);
        manager.minimize_overlay("studio");
        assert!(manager.get("studio").unwrap().minimized);

        manager.open_overlay("studio");
        assert!(!manager.get("studio").unwrap().minimized);
        assert_eq!(manager.phase("studio"), WindowPhase::Focused);
    }

    #[test]
    fn open_raises_existing_window() {
        let mut manager = opened(&["a", "b", "c"]);
        manager.open_overlay("a");
        assert_eq!(ids(&manager), ["b", "c", "a"]);
    }

    #[test]
    fn close_removes_minimized_window() {
        let mut manager = opened(&["studio"]);
        manager.minimize_overlay("studio");
        manager.close_overlay("studio");
        assert!(manager.is_empty());
        assert_eq!(manager.phase("studio"), WindowPhase::Closed);
    }

    #[test]
    fn focus_moves_to_top() {
        let mut manager = opened(&["a", "b", "c"]);
        manager.focus_overlay("a");
        assert_eq!(ids(&manager), ["b", "c", "a"]);
        assert_eq!(manager.focused().map(AppId::as_str), Some("a"));
    }

    #[test]
    fn minimize_keeps_z_order() {
        let mut manager = opened(&["a", "b", "c"]);
        manager.minimize_overlay("b");
        assert_eq!(ids(&manager), ["a", "b", "c"]);
        assert_eq!(manager.phase("b"), WindowPhase::Minimized);
    }

    #[test]
    fn focus_keeps_minimized_flag() {
        let mut manager = opened(&["a", "b"]);
        manager.minimize_overlay("a");
        manager.focus_overlay("a");
        assert_eq!(ids(&manager), ["b", "a"]);
        assert!(manager.get("a").unwrap().minimized);
        // a minimized window on top does not take focus
        assert_eq!(manager.focused().map(AppId::as_str), Some("b"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut manager = opened(&["a"]);
        let revision = manager.revision();
        manager.close_overlay("nope");
        manager.minimize_overlay("nope");
        manager.focus_overlay("nope");
        manager.toggle_from_dock("nope");
        assert_eq!(ids(&manager), ["a"]);
        assert_eq!(manager.revision(), revision);
    }

    #[test]
    fn dock_toggle_cycles_through_states() {
        let mut manager = opened(&["a", "b"]);
        assert_eq!(manager.phase("a"), WindowPhase::Background);

        manager.toggle_from_dock("a");
        assert_eq!(manager.phase("a"), WindowPhase::Focused);

        manager.toggle_from_dock("a");
        assert_eq!(manager.phase("a"), WindowPhase::Minimized);

        manager.toggle_from_dock("a");
        assert_eq!(manager.phase("a"), WindowPhase::Focused);
        assert_eq!(ids(&manager), ["b", "a"]);
    }

    #[test]
    fn studio_walkthrough() {
        let mut manager = OverlayWindowManager::new();

        manager.open_overlay("studio");
        assert_eq!(
            manager.windows(),
            [OverlayWindowState {
                app_id: "studio".into(),
                minimized: false,
            }]
        );

        manager.minimize_overlay("studio");
        assert_eq!(
            manager.windows(),
            [OverlayWindowState {
                app_id: "studio".into(),
                minimized: true,
            }]
        );
        let dock: Vec<_> = manager.minimized_apps().map(AppId::as_str).collect();
        assert_eq!(dock, ["studio"]);

        manager.toggle_from_dock("studio");
        assert_eq!(
            manager.windows(),
            [OverlayWindowState {
                app_id: "studio".into(),
                minimized: false,
            }]
        );

        manager.close_overlay("studio");
        assert!(manager.windows().is_empty());
    }

    #[test]
    fn observers_see_each_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut manager = OverlayWindowManager::new();
        manager.observe({
            let seen = seen.clone();
            move |event, windows| seen.borrow_mut().push((event.clone(), windows.len()))
        });

        manager.open_overlay("a");
        manager.open_overlay("a");
        manager.minimize_overlay("a");
        manager.open_overlay("a");
        manager.close_overlay("a");

        assert_eq!(
            *seen.borrow(),
            [
                (WindowEvent::Opened("a".into()), 1),
                (WindowEvent::Minimized("a".into()), 1),
                (WindowEvent::Restored("a".into()), 1),
                (WindowEvent::Closed("a".into()), 0),
            ]
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Open(usize),
        Close(usize),
        Minimize(usize),
        Focus(usize),
        Toggle(usize),
    }

    const APPS: [&str; 4] = ["marketplace", "studio", "concierge", "unknown"];

    fn op() -> impl Strategy<Value = Op> {
        let app = 0..APPS.len();
        prop_oneof![
            app.clone().prop_map(Op::Open),
            app.clone().prop_map(Op::Close),
            app.clone().prop_map(Op::Minimize),
            app.clone().prop_map(Op::Focus),
            app.prop_map(Op::Toggle),
        ]
    }

    proptest! {
        #[test]
        fn ids_stay_unique(ops in prop::collection::vec(op(), 0..64)) {
            let mut manager = OverlayWindowManager::new();
            for op in ops {
                match op {
                    Op::Open(i) => manager.open_overlay(APPS[i]),
                    Op::Close(i) => manager.close_overlay(APPS[i]),
                    Op::Minimize(i) => manager.minimize_overlay(APPS[i]),
                    Op::Focus(i) => manager.focus_overlay(APPS[i]),
                    Op::Toggle(i) => manager.toggle_from_dock(APPS[i]),
                }
                let mut seen = ids(&manager);
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), manager.len());
            }
        }

        #[test]
        fn open_always_ends_focused(ops in prop::collection::vec(op(), 0..32), target in 0..APPS.len()) {
            let mut manager = OverlayWindowManager::new();
            for op in ops {
                match op {
                    Op::Open(i) => manager.open_overlay(APPS[i]),
                    Op::Close(i) => manager.close_overlay(APPS[i]),
                    Op::Minimize(i) => manager.minimize_overlay(APPS[i]),
                    Op::Focus(i) => manager.focus_overlay(APPS[i]),
                    Op::Toggle(i) => manager.toggle_from_dock(APPS[i]),
                }
            }
            manager.open_overlay(APPS[target]);
            let top = manager.windows().last().unwrap();
            prop_assert_eq!(top.app_id.as_str(), APPS[target]);
            prop_assert!(!top.minimized);
            prop_assert_eq!(manager.phase(APPS[target]), WindowPhase::Focused);
        }
    }
}
