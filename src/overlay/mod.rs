//! Floating overlays: loading, error, custom info and the button panel, plus
//! the privacy balls and the character thumbnail shown beside the dropdown.
//!
//! The loading overlay and the button panel share one saved position
//! (`overlayPosition`); dragging either one moves the other along. The custom
//! overlay keeps its own position and size.

mod button_panel;
mod custom;
mod error_overlay;
mod loading;
mod position;
mod privacy;
mod thumb_overlay;

pub use button_panel::{ButtonPanel, PanelRelease};
pub use custom::CustomOverlay;
pub use error_overlay::ErrorOverlay;
pub use loading::{LoadingImage, LoadingOverlay};
pub use position::{OverlayPosition, OverlaySize};
pub use privacy::PrivacyBalls;
pub use thumb_overlay::{place_thumb_overlay, HoverAnchor, ThumbOverlay};

use std::rc::Rc;
use std::time::Duration;

use cg_ui::{DragEnd, Point, Size};
use web_time::Instant;

use crate::config::UserPreferences;
use crate::constants::{KEY_OVERLAY_POSITION, LOADING_OVERLAY_SIZE, LOADING_TICK_MS};
use crate::scheduler::{Scheduler, Timer, TimerId};
use crate::storage::{self, KeyValueStore};
use crate::surface::{CustomRender, ErrorRender, LoadingRender, PanelRender};

use position::{load_position, loading_default, save_position};

/// Result string of a successful run.
pub const RESPONSE_SUCCESS: &str = "success";

/// Which overlay a pointer press grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Loading,
    Panel,
    Custom,
    CustomResize,
}

/// Owns every overlay and the state of the current pointer drag.
pub struct OverlayManager {
    store: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn Scheduler>,
    viewport: Size,
    texts: UserPreferences,
    loading: Option<LoadingOverlay>,
    tick: Option<TimerId>,
    error: Option<ErrorOverlay>,
    custom: Option<CustomOverlay>,
    panel: ButtonPanel,
    target: Option<DragTarget>,
}

impl OverlayManager {
    pub fn new(
        store: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        viewport: Size,
        texts: UserPreferences,
    ) -> Self {
        let panel = ButtonPanel::new(store.as_ref(), viewport);
        Self {
            store,
            scheduler,
            viewport,
            texts,
            loading: None,
            tick: None,
            error: None,
            custom: None,
            panel,
            target: None,
        }
    }

    pub fn loading(&self) -> Option<&LoadingOverlay> {
        self.loading.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorOverlay> {
        self.error.as_ref()
    }

    pub fn custom(&self) -> Option<&CustomOverlay> {
        self.custom.as_ref()
    }

    pub fn panel(&self) -> &ButtonPanel {
        &self.panel
    }

    fn update_panel_visibility(&mut self) {
        let blocked = self.loading.is_some() || self.error.is_some();
        self.panel
            .set_blocked(blocked, self.store.as_ref(), self.viewport);
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Show the loading overlay at the saved position, else where the button
    /// panel is, else centred near the top.
    pub fn show_loading(&mut self, now: Instant) {
        let default = loading_default(self.viewport);
        let position = load_position(self.store.as_ref(), KEY_OVERLAY_POSITION)
            .or_else(|| (!self.panel.is_minimized()).then(|| self.panel.position()))
            .unwrap_or(default);

        self.loading = Some(LoadingOverlay::new(
            self.texts.loading_message.clone(),
            position,
            now,
        ));

        self.cancel_tick();
        self.schedule_tick();
        self.update_panel_visibility();
        log::debug!("[overlay] loading shown");
    }

    fn schedule_tick(&mut self) {
        self.tick = Some(
            self.scheduler
                .schedule(Duration::from_millis(LOADING_TICK_MS), Timer::LoadingTick),
        );
    }

    fn cancel_tick(&mut self) {
        if let Some(id) = self.tick.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Elapsed counter timer fired. Returns true if the overlay should be
    /// re-rendered.
    pub fn on_tick(&mut self) -> bool {
        self.tick = None;
        if self.loading.is_none() {
            return false;
        }
        self.schedule_tick();
        true
    }

    pub fn show_preview(&mut self, data_uri: &str) -> bool {
        self.loading
            .as_mut()
            .is_some_and(|overlay| overlay.show_preview(data_uri))
    }

    pub fn preview_failed(&mut self) {
        if let Some(overlay) = self.loading.as_mut() {
            overlay.preview_failed();
        }
    }

    /// A run finished. Removes the loading overlay, moves the button panel to
    /// where it was and opens the error overlay unless `result` is
    /// [`RESPONSE_SUCCESS`].
    pub fn handle_response(&mut self, result: &str) {
        self.cancel_tick();
        if let Some(overlay) = self.loading.take() {
            self.panel.move_to(overlay.position());
        }
        if result != RESPONSE_SUCCESS {
            log::error!("[overlay] backend reported: {}", result);
            self.error = Some(ErrorOverlay::new(result));
        }
        self.update_panel_visibility();
    }

    // =========================================================================
    // Error & custom
    // =========================================================================

    pub fn show_error(&mut self, message: &str) {
        self.error = Some(ErrorOverlay::new(message));
        self.update_panel_visibility();
    }

    /// Error overlay clicked. Returns the text to copy; the overlay closes
    /// unless the click hit a link.
    pub fn click_error(&mut self, on_link: bool) -> Option<String> {
        let payload = self.error.as_ref()?.click(on_link)?;
        self.error = None;
        self.update_panel_visibility();
        Some(payload)
    }

    pub fn show_custom(&mut self, message: &str, image: Option<String>) {
        self.custom = Some(CustomOverlay::open(
            message,
            image,
            self.store.as_ref(),
            self.viewport,
        ));
    }

    pub fn close_custom(&mut self) {
        self.custom = None;
    }

    pub fn custom_image_failed(&mut self) {
        if let Some(custom) = self.custom.as_mut() {
            custom.image_failed();
        }
    }

    pub fn toggle_panel(&mut self) -> bool {
        self.panel
            .toggle_minimized(self.store.as_ref(), self.viewport)
    }

    // =========================================================================
    // Pointer
    // =========================================================================

    pub fn pointer_down(&mut self, target: DragTarget, pointer: Point) {
        match target {
            DragTarget::Loading => match self.loading.as_mut() {
                Some(overlay) => overlay.drag.begin(pointer),
                None => return,
            },
            DragTarget::Panel => self.panel.pointer_down(pointer),
            DragTarget::Custom => match self.custom.as_mut() {
                Some(custom) => custom.drag.begin(pointer),
                None => return,
            },
            DragTarget::CustomResize => match self.custom.as_mut() {
                Some(custom) => custom.resize.begin(pointer),
                None => return,
            },
        }
        self.target = Some(target);
    }

    /// Returns true if anything moved.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        match target {
            DragTarget::Loading => {
                let Some(position) = self.loading.as_mut().and_then(|o| o.drag.motion(pointer))
                else {
                    return false;
                };
                self.panel.move_to(position);
                true
            }
            DragTarget::Panel => {
                let Some(position) = self.panel.pointer_move(pointer) else {
                    return false;
                };
                if let Some(overlay) = self.loading.as_mut() {
                    overlay.drag.set_position(position);
                }
                true
            }
            DragTarget::Custom => self
                .custom
                .as_mut()
                .and_then(|c| c.drag.motion(pointer))
                .is_some(),
            DragTarget::CustomResize => self
                .custom
                .as_mut()
                .and_then(|c| c.resize.motion(pointer))
                .is_some(),
        }
    }

    /// Finish the current drag. For the panel, returns whether the press
    /// counts as a click on a run button.
    pub fn pointer_up(&mut self) -> Option<PanelRelease> {
        let target = self.target.take()?;
        let store = self.store.as_ref();
        match target {
            DragTarget::Loading => {
                let overlay = self.loading.as_mut()?;
                let default = loading_default(self.viewport);
                match overlay.drag.end(LOADING_OVERLAY_SIZE, self.viewport, default) {
                    Some(DragEnd::Kept(position)) => {
                        save_position(store, KEY_OVERLAY_POSITION, position);
                        self.panel.move_to(position);
                    }
                    Some(DragEnd::Reset(position)) => {
                        storage::forget(store, KEY_OVERLAY_POSITION);
                        self.panel.move_to(position);
                    }
                    None => {}
                }
                None
            }
            DragTarget::Panel => {
                let release = self.panel.pointer_up(store, self.viewport);
                if let (Some(end), Some(overlay)) = (release.drag, self.loading.as_mut()) {
                    overlay.drag.set_position(end.position());
                }
                Some(release)
            }
            DragTarget::Custom => {
                if let Some(custom) = self.custom.as_mut() {
                    custom.finish_drag(store, self.viewport);
                }
                None
            }
            DragTarget::CustomResize => {
                if let Some(custom) = self.custom.as_mut() {
                    custom.finish_resize(store);
                }
                None
            }
        }
    }

    /// Window resized: move overlays that left the viewport back to their
    /// defaults and shrink the custom overlay to fit.
    pub fn viewport_resized(&mut self, viewport: Size) {
        self.viewport = viewport;
        if let Some(overlay) = self.loading.as_mut() {
            overlay
                .drag
                .settle(LOADING_OVERLAY_SIZE, viewport, loading_default(viewport));
        }
        if !self.panel.is_minimized() {
            self.panel.settle(viewport);
        }
        if let Some(custom) = self.custom.as_mut() {
            custom.fit(self.store.as_ref(), viewport);
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    pub fn loading_render(&self, now: Instant) -> Option<LoadingRender> {
        let overlay = self.loading.as_ref()?;
        Some(LoadingRender {
            position: overlay.position(),
            message: overlay.message().to_string(),
            elapsed: overlay.elapsed_text(
                now,
                &self.texts.elapsed_prefix,
                &self.texts.elapsed_suffix,
            ),
            preview: match overlay.image() {
                LoadingImage::Waiting => None,
                LoadingImage::Preview(uri) => Some(uri.clone()),
            },
        })
    }

    pub fn error_render(&self) -> Option<ErrorRender> {
        self.error.as_ref().map(|error| ErrorRender { html: error.html() })
    }

    pub fn custom_render(&self) -> Option<CustomRender> {
        self.custom.as_ref().map(|custom| CustomRender {
            position: custom.position(),
            size: custom.size(),
            html: custom.html().to_string(),
            image: custom.image().map(str::to_string),
        })
    }

    pub fn panel_render(&self) -> PanelRender {
        PanelRender {
            position: self.panel.position(),
            minimized: self.panel.is_minimized(),
            visible: self.panel.is_visible(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::storage::MemoryStore;

    const VIEWPORT: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    fn manager() -> (OverlayManager, Rc<MemoryStore>, Rc<ManualScheduler>) {
        let store = Rc::new(MemoryStore::new());
        let scheduler = Rc::new(ManualScheduler::new());
        let manager = OverlayManager::new(
            store.clone(),
            scheduler.clone(),
            VIEWPORT,
            UserPreferences::default(),
        );
        (manager, store, scheduler)
    }

    #[test]
    fn test_loading_starts_at_panel_and_ticks() {
        let (mut overlays, _, scheduler) = manager();
        overlays.show_loading(Instant::now());

        let loading = overlays.loading().unwrap();
        assert_eq!(loading.position(), overlays.panel().position());
        assert!(!overlays.panel().is_visible());
        assert_eq!(scheduler.pending_count(), 1);

        assert_eq!(scheduler.take_first(|t| *t == Timer::LoadingTick), Some(Timer::LoadingTick));
        assert!(overlays.on_tick());
        assert_eq!(scheduler.pending_count(), 1);

        overlays.handle_response(RESPONSE_SUCCESS);
        assert!(overlays.loading().is_none());
        assert!(overlays.panel().is_visible());
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!overlays.on_tick());
    }

    #[test]
    fn test_error_response_blocks_panel_until_clicked() {
        let (mut overlays, _, _) = manager();
        overlays.show_loading(Instant::now());
        overlays.handle_response("[COPY_URL]https://h.example/log[/COPY_URL] failed");

        assert!(overlays.error().is_some());
        assert!(!overlays.panel().is_visible());
        assert_eq!(overlays.click_error(true), None);
        assert!(overlays.error().is_some());
        assert_eq!(
            overlays.click_error(false).as_deref(),
            Some("https://h.example/log")
        );
        assert!(overlays.error().is_none());
        assert!(overlays.panel().is_visible());
    }

    #[test]
    fn test_loading_drag_moves_panel_and_persists() {
        let (mut overlays, store, _) = manager();
        overlays.show_loading(Instant::now());
        let start = overlays.loading().unwrap().position();

        overlays.pointer_down(DragTarget::Loading, start);
        assert!(overlays.pointer_move(Point::new(100.0, 100.0)));
        assert_eq!(overlays.panel().position(), Point::new(100.0, 100.0));
        assert!(overlays.pointer_up().is_none());
        assert_eq!(
            load_position(store.as_ref(), KEY_OVERLAY_POSITION),
            Some(Point::new(100.0, 100.0))
        );

        overlays.handle_response(RESPONSE_SUCCESS);
        overlays.show_loading(Instant::now());
        assert_eq!(
            overlays.loading().unwrap().position(),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_loading_render_and_preview() {
        let (mut overlays, _, _) = manager();
        let now = Instant::now();
        assert!(!overlays.show_preview("data:image/png;base64,A"));
        overlays.show_loading(now);
        assert!(overlays.show_preview("data:image/png;base64,A"));

        let render = overlays
            .loading_render(now + Duration::from_secs(3))
            .unwrap();
        assert_eq!(render.message, "Processing...");
        assert_eq!(render.elapsed, "Time elapsed:  3 sec");
        assert_eq!(render.preview.as_deref(), Some("data:image/png;base64,A"));

        overlays.preview_failed();
        assert_eq!(overlays.loading_render(now).unwrap().preview, None);
    }

    #[test]
    fn test_resize_resets_out_of_view_panel() {
        let (mut overlays, _, _) = manager();
        assert_eq!(overlays.panel().position(), Point::new(380.0, 640.0));
        overlays.viewport_resized(Size::new(500.0, 400.0));
        assert_eq!(overlays.panel().position(), Point::new(130.0, 320.0));
    }
}
