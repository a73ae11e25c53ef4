//! Application wiring.
//!
//! [`Frontend`] owns every component and routes host events between them.
//! It is driven entirely from outside: the browser binding forwards DOM
//! events, socket callbacks and fired timers; tests call the same methods
//! directly.

use std::collections::BTreeMap;

use cg_ui::{
    DropdownController, DropdownError, InputOutcome, Key, KeyOutcome, Modifiers, MouseButton,
    Point, Rect, ScrollDrag, Size, SuggestionItem, TagEditor,
};
use web_time::Instant;

use crate::channel::{ChannelClient, ChannelEvent, ConnectionId, FinalImage, Transport};
use crate::constants::KEY_GRID_ASPECT_RATIO;
use crate::context::AppContext;
use crate::dropdowns::{CHARACTER_CONTAINER, OptionData, OptionKind, parse_labels};
use crate::gallery::{
    FullscreenAction, FullscreenViewer, GalleryCell, GalleryError, GalleryMode, GalleryStore,
    GalleryView, GridLayout, seed_to_apply,
};
use crate::info_box::InfoBox;
use crate::overlay::{DragTarget, HoverAnchor, OverlayManager, PrivacyBalls, ThumbOverlay};
use crate::scheduler::Timer;
use crate::storage;
use crate::suggest::{SuggestError, SuggestionService};
use crate::surface::{
    Clipboard, DropdownRender, FullscreenRender, GalleryRender, ScrollTarget, SuggestionRender,
    ThumbsRender, UiSurface,
};
use crate::thumbs::ThumbGallery;

/// Aspect ratio assumed until the first grid image is measured
const DEFAULT_ASPECT_RATIO: f32 = 1.0;

/// Host services the front end talks to.
pub struct Services {
    pub transport: Box<dyn Transport>,
    pub suggestions: Box<dyn SuggestionService>,
    pub surface: Box<dyn UiSurface>,
    pub clipboard: Box<dyn Clipboard>,
}

/// The whole front end state
pub struct Frontend {
    ctx: AppContext,
    channel: ChannelClient,
    suggestions: Box<dyn SuggestionService>,
    surface: Box<dyn UiSurface>,
    clipboard: Box<dyn Clipboard>,
    gallery: GalleryStore,
    view: GalleryView,
    fullscreen: Option<FullscreenViewer>,
    thumbs: ThumbGallery,
    overlays: OverlayManager,
    privacy: PrivacyBalls,
    thumb_overlay: ThumbOverlay,
    scroll: Option<(ScrollTarget, ScrollDrag)>,
    info: InfoBox,
    editors: BTreeMap<String, TagEditor>,
}

fn dropdown_render(dropdown: &DropdownController) -> DropdownRender {
    DropdownRender {
        labels: dropdown.labels().to_vec(),
        displayed: (0..dropdown.field_count())
            .map(|i| dropdown.displayed(i).unwrap_or_default().to_string())
            .collect(),
        active: dropdown.active(),
        open: dropdown.is_open(),
        items: dropdown.visible_items(),
        searchable: dropdown.is_searchable(),
    }
}

fn suggestion_render(editor: &TagEditor) -> Option<SuggestionRender> {
    (editor.is_visible() && !editor.items().is_empty()).then(|| SuggestionRender {
        items: editor.items().iter().map(|item| item.markup.clone()).collect(),
        selected: editor.selected(),
        width: editor.box_width(),
    })
}

impl Frontend {
    pub fn new(ctx: AppContext, services: Services) -> Self {
        let channel = ChannelClient::new(
            &ctx.config.channel,
            services.transport,
            ctx.scheduler.clone(),
        );
        let overlays = OverlayManager::new(
            ctx.store.clone(),
            ctx.scheduler.clone(),
            ctx.viewport,
            ctx.config.preferences.clone(),
        );
        let mut view = GalleryView::new();
        view.set_last_aspect(storage::load_json(ctx.store.as_ref(), KEY_GRID_ASPECT_RATIO));

        Self {
            ctx,
            channel,
            suggestions: services.suggestions,
            surface: services.surface,
            clipboard: services.clipboard,
            gallery: GalleryStore::new(),
            view,
            fullscreen: None,
            thumbs: ThumbGallery::new(),
            overlays,
            privacy: PrivacyBalls::new(),
            thumb_overlay: ThumbOverlay::new(),
            scroll: None,
            info: InfoBox::new(),
            editors: BTreeMap::new(),
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn channel(&self) -> &ChannelClient {
        &self.channel
    }

    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    pub fn gallery_view(&self) -> &GalleryView {
        &self.view
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn editor(&self, input: &str) -> Option<&TagEditor> {
        self.editors.get(input)
    }

    /// Ids of the inputs with an attached tag editor.
    pub fn editor_inputs(&self) -> Vec<String> {
        self.editors.keys().cloned().collect()
    }

    /// Draw the initial page state.
    pub fn render_all(&mut self) {
        self.render_gallery(false);
        self.render_overlays();
        self.surface.render_info_box(&self.info.render());
    }

    // =========================================================================
    // Push channel
    // =========================================================================

    pub fn open_channel(&mut self) -> Option<ConnectionId> {
        self.channel.open()
    }

    pub fn close_channel(&mut self) {
        self.channel.close();
    }

    pub fn on_channel_open(&mut self, id: ConnectionId) {
        self.channel.handle_open(id);
    }

    pub fn on_channel_close(&mut self, id: ConnectionId) {
        self.channel.handle_close(id);
    }

    pub fn on_channel_error(&mut self, id: ConnectionId, message: &str) {
        self.channel.handle_error(id, message);
    }

    pub fn on_channel_message(&mut self, id: ConnectionId, text: &str) {
        match self.channel.handle_message(id, text) {
            Some(ChannelEvent::Preview(data_uri)) => {
                if self.overlays.show_preview(&data_uri) {
                    self.render_loading();
                }
            }
            Some(ChannelEvent::Final(image)) => self.append_final(image),
            None => {}
        }
    }

    /// The loading overlay failed to display the pending preview.
    pub fn preview_failed(&mut self) {
        self.channel.clear_pending_preview();
        self.overlays.preview_failed();
        self.render_loading();
    }

    fn append_final(&mut self, image: FinalImage) {
        let FinalImage {
            data_uri,
            seed,
            tags,
            keep_gallery,
            final_infos,
        } = image;
        self.append_image_data(data_uri, seed, tags, keep_gallery);
        if let Some(infos) = final_infos {
            self.info.update_content(&infos);
            self.surface.render_info_box(&self.info.render());
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// A timer scheduled through the context's scheduler fired.
    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Reconnect => self.channel.handle_retry_timer(),
            Timer::LoadingTick => {
                if self.overlays.on_tick() {
                    self.render_loading();
                }
            }
            Timer::SuggestInput { input, token } => self.run_suggest_input(&input, token),
            Timer::DropdownSearch { container, token } => {
                let Some(dropdown) = self.ctx.dropdown_mut(&container) else {
                    return;
                };
                if dropdown.on_search_timer(token) {
                    self.surface
                        .render_dropdown(&container, &dropdown_render(dropdown));
                }
            }
        }
    }

    // =========================================================================
    // Tag editor
    // =========================================================================

    /// Enable autocompletion on the prompt input `input`.
    pub fn attach_tag_editor(&mut self, input: &str) {
        let editor = TagEditor::with_debounce(self.ctx.config.suggest.debounce_ms);
        if self.editors.insert(input.to_string(), editor).is_some() {
            log::debug!("[suggest] re-attached to '{}'", input);
        }
    }

    /// The value of `input` changed.
    pub fn editor_input(&mut self, input: &str) {
        let Some(editor) = self.editors.get_mut(input) else {
            return;
        };
        let token = editor.input_changed();
        self.ctx.scheduler.schedule(
            editor.debounce_delay(),
            Timer::SuggestInput {
                input: input.to_string(),
                token,
            },
        );
    }

    fn run_suggest_input(&mut self, input: &str, token: cg_ui::DebounceToken) {
        let Some((text, cursor)) = self.surface.input_state(input) else {
            return;
        };
        let Some(editor) = self.editors.get_mut(input) else {
            return;
        };
        match editor.on_input(token, &text, cursor) {
            InputOutcome::Fetch(request) => {
                log::debug!("[suggest] lookup '{}' (#{})", request.word, request.generation);
                self.suggestions.request(input, request);
            }
            InputOutcome::Hide => {
                editor.hide();
                self.surface.render_suggestions(input, None);
            }
            InputOutcome::Stale | InputOutcome::Suppressed => {}
        }
    }

    /// The completion service answered request `generation` for `input`.
    pub fn on_suggestions(
        &mut self,
        input: &str,
        generation: u64,
        result: Result<Vec<SuggestionItem>, SuggestError>,
    ) {
        let Some(editor) = self.editors.get_mut(input) else {
            return;
        };
        match result {
            Ok(items) => {
                if editor.on_suggestions(generation, items) {
                    self.surface
                        .render_suggestions(input, suggestion_render(editor).as_ref());
                }
            }
            Err(e) => {
                log::warn!("[suggest] lookup failed: {}", e);
                editor.on_fetch_failed(generation);
                self.surface
                    .render_suggestions(input, suggestion_render(editor).as_ref());
            }
        }
    }

    /// Key pressed in `input`. `selection` is in byte offsets. Returns true
    /// when the key was consumed and its default action should be prevented.
    pub fn editor_key(
        &mut self,
        input: &str,
        key: Key,
        modifiers: Modifiers,
        selection: (usize, usize),
    ) -> bool {
        let Some((text, _)) = self.surface.input_state(input) else {
            return false;
        };
        let Some(editor) = self.editors.get_mut(input) else {
            return false;
        };
        match editor.on_key(key, modifiers, &text, selection) {
            KeyOutcome::Ignored => false,
            KeyOutcome::Handled => {
                self.surface
                    .render_suggestions(input, suggestion_render(editor).as_ref());
                true
            }
            KeyOutcome::Edit(edit) => {
                self.surface.write_input(input, &edit);
                self.surface
                    .render_suggestions(input, suggestion_render(editor).as_ref());
                true
            }
        }
    }

    /// Suggestion `index` was clicked.
    pub fn accept_suggestion(&mut self, input: &str, index: usize) {
        let Some((text, cursor)) = self.surface.input_state(input) else {
            return;
        };
        let Some(editor) = self.editors.get_mut(input) else {
            return;
        };
        if let Some(edit) = editor.accept(index, &text, cursor) {
            self.surface.write_input(input, &edit);
        }
        self.surface.render_suggestions(input, None);
    }

    /// A click landed on the page while `input` has an editor.
    pub fn editor_click(&mut self, input: &str, inside_box_or_input: bool) {
        let Some(editor) = self.editors.get_mut(input) else {
            return;
        };
        let was_visible = editor.is_visible();
        editor.click_elsewhere(inside_box_or_input);
        if was_visible && !editor.is_visible() {
            self.surface.render_suggestions(input, None);
        }
    }

    // =========================================================================
    // Dropdowns
    // =========================================================================

    /// Replace the options of the dropdown in `container`, registering it on
    /// first use.
    pub fn set_dropdown_options(
        &mut self,
        container: &str,
        data: &OptionData,
        originals: &[String],
        labels: Option<&str>,
        defaults: &[String],
        enable_search: Option<bool>,
    ) -> Result<(), DropdownError> {
        let kind = OptionKind::for_container(container)
            .ok_or_else(|| DropdownError::InvalidOptions(format!("unknown dropdown '{}'", container)))?;
        if self.ctx.dropdown(container).is_none() {
            self.ctx.register_dropdown(container, kind.controller());
        }
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return Ok(());
        };

        let sets = kind.option_sets(data, originals, dropdown.field_count())?;
        let writes = dropdown.set_options(sets, labels.map(parse_labels), defaults, enable_search)?;
        for write in &writes {
            self.surface.write_field(container, write);
        }
        self.surface
            .render_dropdown(container, &dropdown_render(dropdown));
        Ok(())
    }

    pub fn update_dropdown_defaults(&mut self, container: &str, defaults: &[String]) {
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            log::warn!("[dropdown] no dropdown in '{}'", container);
            return;
        };
        for write in dropdown.update_defaults(defaults) {
            self.surface.write_field(container, &write);
        }
        self.surface
            .render_dropdown(container, &dropdown_render(dropdown));
    }

    pub fn dropdown_value(&self, container: &str) -> Vec<String> {
        self.ctx
            .dropdown(container)
            .map(DropdownController::value)
            .unwrap_or_default()
    }

    pub fn dropdown_click_field(&mut self, container: &str, index: usize) {
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return;
        };
        if let Err(e) = dropdown.click_field(index) {
            log::warn!("[dropdown] {}", e);
            return;
        }
        self.surface
            .render_dropdown(container, &dropdown_render(dropdown));
    }

    pub fn dropdown_search(&mut self, container: &str, index: usize, text: &str) {
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return;
        };
        let delay = dropdown.search_delay();
        match dropdown.on_search_input(index, text) {
            Ok(token) => {
                self.ctx.scheduler.schedule(
                    delay,
                    Timer::DropdownSearch {
                        container: container.to_string(),
                        token,
                    },
                );
            }
            Err(e) => log::warn!("[dropdown] {}", e),
        }
    }

    pub fn dropdown_select(&mut self, container: &str, key: &str) {
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return;
        };
        if let Some((write, change)) = dropdown.select(key) {
            self.surface.write_field(container, &write);
            self.surface.dropdown_changed(container, &change.values);
        }
        self.surface
            .render_dropdown(container, &dropdown_render(dropdown));
    }

    /// A click landed outside every dropdown.
    pub fn dropdown_click_outside(&mut self) {
        for (container, dropdown) in self.ctx.dropdowns_mut() {
            if dropdown.is_open() || dropdown.active().is_some() {
                dropdown.click_outside();
                self.surface
                    .render_dropdown(container, &dropdown_render(dropdown));
            }
        }
    }

    /// Pointer entered option `key`. `anchor` locates it on screen for the
    /// character thumbnail.
    pub fn dropdown_hover(&mut self, container: &str, key: &str, anchor: Option<HoverAnchor>) {
        let viewport = self.ctx.viewport;
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return;
        };
        let Some(key) = dropdown.hover(key, Instant::now()) else {
            return;
        };
        let field = dropdown.active();
        self.surface.hover_preview(container, Some(&key));

        if container != CHARACTER_CONTAINER {
            return;
        }
        match (field, anchor) {
            (Some(field), Some(anchor)) => self.thumb_overlay.show(field, &anchor, viewport),
            _ => self.thumb_overlay.hide(),
        }
        self.render_thumb_overlay();
    }

    pub fn dropdown_hover_leave(&mut self, container: &str) {
        let Some(dropdown) = self.ctx.dropdown_mut(container) else {
            return;
        };
        if dropdown.hover_leave() {
            self.surface.hover_preview(container, None);
            if container == CHARACTER_CONTAINER {
                self.thumb_overlay.hide();
                self.render_thumb_overlay();
            }
        }
    }

    /// Thumbnail pushed by the page for the hovered character. Repeats of
    /// the last character are ignored.
    pub fn update_thumb_overlay(&mut self, character: &str, image: Option<String>) {
        if self.thumb_overlay.update(character, image) {
            log::debug!("[dropdown] thumbnail for '{}'", character);
            self.render_thumb_overlay();
        }
    }

    fn render_thumb_overlay(&mut self) {
        self.surface
            .render_thumb_overlay(self.thumb_overlay.render().as_ref());
    }

    // =========================================================================
    // Gallery
    // =========================================================================

    /// Replace the whole gallery. `seeds` and `tags` default to empty strings
    /// when not supplied.
    pub fn update_gallery(
        &mut self,
        images: Vec<String>,
        seeds: Option<Vec<String>>,
        tags: Option<Vec<String>>,
    ) -> Result<(), GalleryError> {
        let len = images.len();
        let seeds = seeds.unwrap_or_else(|| vec![String::new(); len]);
        let tags = tags.unwrap_or_else(|| vec![String::new(); len]);
        self.gallery.replace_all(images, seeds, tags)?;
        self.view.reset();
        self.fullscreen = None;
        self.surface.render_fullscreen(None);
        self.render_gallery(false);
        Ok(())
    }

    /// Append one image; `keep_gallery == false` starts a new session.
    pub fn append_image_data(
        &mut self,
        data_uri: String,
        seed: String,
        tags: String,
        keep_gallery: bool,
    ) {
        let cleared = self.gallery.append(data_uri, seed, tags, keep_gallery);
        if cleared {
            self.view.reset();
            if self.fullscreen.take().is_some() {
                self.surface.render_fullscreen(None);
            }
        }
        log::debug!("[gallery] {} images", self.gallery.len());
        self.render_gallery(!cleared);
    }

    pub fn toggle_gallery_mode(&mut self) -> GalleryMode {
        let mode = self.view.toggle_mode(&self.gallery);
        self.render_gallery(false);
        mode
    }

    /// The page measured the newest grid image.
    pub fn grid_measured(&mut self, aspect: f32) {
        if !aspect.is_finite() || aspect <= 0.0 {
            return;
        }
        storage::persist(self.ctx.store.as_ref(), KEY_GRID_ASPECT_RATIO, &aspect);
        if self.view.mode() == GalleryMode::Grid {
            self.render_grid(aspect, true);
        } else {
            self.view.set_last_aspect(Some(aspect));
        }
    }

    /// Click beside the main split-mode image.
    pub fn gallery_side_click(&mut self, right_half: bool) {
        if self.gallery.len() > 1 && self.view.click_main(right_half, &self.gallery).is_some() {
            self.render_gallery(true);
        }
    }

    /// Filmstrip thumbnail clicked; `position` counts from the newest.
    pub fn gallery_strip_click(&mut self, position: usize) {
        if self.view.click_strip(position, &self.gallery).is_some() {
            self.render_gallery(true);
        }
    }

    fn render_gallery(&mut self, incremental: bool) {
        match self.view.mode() {
            GalleryMode::Split => {
                let batch = self.view.split_batch(&self.gallery, incremental);
                let focused = self.focused_cell();
                self.surface.render_gallery(&GalleryRender {
                    mode: GalleryMode::Split,
                    batch,
                    focused,
                    label: GalleryView::mode_label(self.gallery.len()),
                    grid: None,
                });
            }
            GalleryMode::Grid => {
                let aspect = self.view.last_aspect().unwrap_or(DEFAULT_ASPECT_RATIO);
                self.render_grid(aspect, incremental);
            }
        }
    }

    fn render_grid(&mut self, aspect: f32, incremental: bool) {
        let batch = self.view.grid_batch(&self.gallery, aspect, incremental);
        if incremental && batch.is_empty() {
            return;
        }
        let layout = GridLayout::compute(
            aspect,
            self.surface.gallery_width(),
            self.ctx.config.gallery.grid_cell_height,
        );
        self.surface.render_gallery(&GalleryRender {
            mode: GalleryMode::Grid,
            batch,
            focused: None,
            label: GalleryView::mode_label(self.gallery.len()),
            grid: Some(layout),
        });
    }

    fn focused_cell(&self) -> Option<GalleryCell> {
        let index = self.view.focus()?;
        let image = self.gallery.get(index).ok()?;
        Some(GalleryCell {
            index,
            data_uri: image.data_uri.clone(),
        })
    }

    /// Copy the focused image's seed and write the seed to apply into the
    /// seed input.
    pub fn copy_seed(&mut self) {
        let Some(index) = self.view.focus() else {
            return;
        };
        let Ok(image) = self.gallery.get(index) else {
            return;
        };
        self.clipboard.write_text(&image.seed);
        let seed = seed_to_apply(&image.seed, self.surface.seed_input());
        self.surface.set_seed_input(seed);
    }

    pub fn copy_tags(&mut self) {
        let Some(index) = self.view.focus() else {
            return;
        };
        match self.gallery.get(index) {
            Ok(image) => self.clipboard.write_text(&image.tags),
            Err(e) => log::warn!("[gallery] {}", e),
        }
    }

    // =========================================================================
    // Fullscreen
    // =========================================================================

    pub fn open_fullscreen(&mut self, index: usize) {
        if index >= self.gallery.len() {
            log::warn!("[gallery] no image {} to show fullscreen", index);
            return;
        }
        self.fullscreen = Some(FullscreenViewer::open(index));
        self.view.set_focus(index, &self.gallery);
        self.render_fullscreen();
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_some()
    }

    /// Returns true when the key was consumed.
    pub fn fullscreen_key(&mut self, key: Key) -> bool {
        let len = self.gallery.len();
        let Some(viewer) = self.fullscreen.as_mut() else {
            return false;
        };
        let action = viewer.on_key(key, len);
        self.apply_fullscreen(action)
    }

    pub fn fullscreen_background_click(&mut self) {
        if let Some(viewer) = self.fullscreen.as_ref() {
            let action = viewer.click_background();
            self.apply_fullscreen(action);
        }
    }

    fn apply_fullscreen(&mut self, action: FullscreenAction) -> bool {
        match action {
            FullscreenAction::Ignored => false,
            FullscreenAction::Show(_) => {
                self.render_fullscreen();
                true
            }
            FullscreenAction::Exit(index) => {
                self.fullscreen = None;
                self.surface.render_fullscreen(None);
                self.view.set_focus(index, &self.gallery);
                if self.view.mode() == GalleryMode::Split {
                    self.render_gallery(true);
                }
                true
            }
        }
    }

    pub fn fullscreen_wheel(&mut self, delta_y: f32) {
        if let Some(viewer) = self.fullscreen.as_mut() {
            viewer.wheel(delta_y);
            self.render_fullscreen();
        }
    }

    pub fn fullscreen_pointer_down(&mut self, pointer: Point) {
        if let Some(viewer) = self.fullscreen.as_mut() {
            viewer.pointer_down(pointer);
        }
    }

    pub fn fullscreen_pointer_move(&mut self, pointer: Point) {
        let moved = self
            .fullscreen
            .as_mut()
            .and_then(|viewer| viewer.pointer_move(pointer))
            .is_some();
        if moved {
            self.render_fullscreen();
        }
    }

    pub fn fullscreen_pointer_up(&mut self) {
        if let Some(viewer) = self.fullscreen.as_mut() {
            viewer.pointer_up();
        }
    }

    fn render_fullscreen(&mut self) {
        let Some(viewer) = self.fullscreen.as_ref() else {
            return;
        };
        let Ok(image) = self.gallery.get(viewer.index()) else {
            return;
        };
        self.surface.render_fullscreen(Some(&FullscreenRender {
            index: viewer.index(),
            data_uri: image.data_uri.clone(),
            transform: viewer.pan_zoom().css_transform(),
        }));
    }

    // =========================================================================
    // Thumbnails & info box
    // =========================================================================

    pub fn update_thumb_gallery(&mut self, images: Vec<String>) {
        if self.thumbs.update(images) {
            self.render_thumbs();
        } else {
            self.surface.render_thumbs(None);
        }
    }

    pub fn toggle_thumb_mode(&mut self) {
        self.thumbs.toggle_mode();
        self.render_thumbs();
    }

    fn render_thumbs(&mut self) {
        self.surface.render_thumbs(Some(&ThumbsRender {
            images: self.thumbs.images().to_vec(),
            mode: self.thumbs.mode(),
        }));
    }

    pub fn set_info_box(&mut self, title: Option<&str>, content: &str) {
        if let Some(title) = title {
            self.info.update_title(title);
        }
        self.info.update_content(content);
        self.surface.render_info_box(&self.info.render());
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    pub fn show_loading(&mut self) {
        self.overlays.show_loading(Instant::now());
        if let Some(preview) = self.channel.pending_preview().map(str::to_string) {
            self.overlays.show_preview(&preview);
        }
        self.render_overlays();
    }

    /// A run finished with `result`; anything but `"success"` is an error
    /// message.
    pub fn handle_response(&mut self, result: &str) {
        self.overlays.handle_response(result);
        self.render_overlays();
    }

    pub fn show_error(&mut self, message: &str) {
        self.overlays.show_error(message);
        self.render_overlays();
    }

    pub fn error_click(&mut self, on_link: bool) {
        if let Some(payload) = self.overlays.click_error(on_link) {
            self.clipboard.write_text(&payload);
            self.render_overlays();
        }
    }

    pub fn show_custom_overlay(&mut self, message: &str, image: Option<String>) {
        self.overlays.show_custom(message, image);
        self.surface
            .render_custom(self.overlays.custom_render().as_ref());
    }

    pub fn close_custom_overlay(&mut self) {
        self.overlays.close_custom();
        self.surface.render_custom(None);
    }

    pub fn custom_image_failed(&mut self) {
        self.overlays.custom_image_failed();
        self.surface
            .render_custom(self.overlays.custom_render().as_ref());
    }

    pub fn toggle_button_panel(&mut self) {
        self.overlays.toggle_panel();
        self.surface.render_panel(&self.overlays.panel_render());
    }

    pub fn overlay_pointer_down(&mut self, target: DragTarget, pointer: Point) {
        self.overlays.pointer_down(target, pointer);
    }

    pub fn overlay_pointer_move(&mut self, pointer: Point) {
        if self.overlays.pointer_move(pointer) {
            self.render_overlays();
        }
    }

    /// Returns true when a button-panel press should count as a click.
    pub fn overlay_pointer_up(&mut self) -> bool {
        let release = self.overlays.pointer_up();
        self.render_overlays();
        release.is_some_and(|release| release.click)
    }

    // =========================================================================
    // Privacy balls
    // =========================================================================

    /// Add a privacy ball over the gallery at `gallery`.
    pub fn spawn_privacy_ball(&mut self, gallery: Rect) {
        if self.privacy.spawn(gallery).is_some() {
            self.render_privacy();
        }
    }

    pub fn privacy_pointer_down(&mut self, id: u32, button: MouseButton, pointer: Point) {
        if self.privacy.pointer_down(id, button, pointer) {
            self.render_privacy();
        }
    }

    pub fn privacy_pointer_move(&mut self, pointer: Point) {
        if self.privacy.pointer_move(pointer) {
            self.render_privacy();
        }
    }

    pub fn privacy_pointer_up(&mut self) {
        if self.privacy.pointer_up() {
            self.render_privacy();
        }
    }

    pub fn remove_privacy_ball(&mut self, id: u32) {
        if self.privacy.remove(id) {
            self.render_privacy();
        }
    }

    fn render_privacy(&mut self) {
        self.surface.render_privacy(&self.privacy.render());
    }

    // =========================================================================
    // Drag to scroll
    // =========================================================================

    pub fn scroll_drag_begin(&mut self, target: ScrollTarget, pointer_x: f32, scroll_left: f32) {
        let mut drag = ScrollDrag::default();
        drag.begin(pointer_x, scroll_left);
        self.scroll = Some((target, drag));
        self.surface.render_scroll_drag(target, Some(scroll_left));
    }

    pub fn scroll_drag_move(&mut self, pointer_x: f32) {
        let Some((target, drag)) = self.scroll.as_mut() else {
            return;
        };
        if let Some(scroll_left) = drag.motion(pointer_x) {
            let target = *target;
            self.surface.render_scroll_drag(target, Some(scroll_left));
        }
    }

    /// Pointer released or left the strip.
    pub fn scroll_drag_end(&mut self) {
        if let Some((target, _)) = self.scroll.take() {
            self.surface.render_scroll_drag(target, None);
        }
    }

    pub fn viewport_resized(&mut self, viewport: Size) {
        self.ctx.viewport = viewport;
        self.overlays.viewport_resized(viewport);
        self.render_overlays();
        if self.view.mode() == GalleryMode::Grid {
            self.render_gallery(false);
        }
    }

    fn render_loading(&mut self) {
        self.surface
            .render_loading(self.overlays.loading_render(Instant::now()).as_ref());
    }

    fn render_overlays(&mut self) {
        self.render_loading();
        self.surface
            .render_error(self.overlays.error_render().as_ref());
        self.surface
            .render_custom(self.overlays.custom_render().as_ref());
        self.surface.render_panel(&self.overlays.panel_render());
    }
}
