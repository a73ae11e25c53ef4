//! WASM entry point and JavaScript API.
//!
//! The page talks to the front end through the `#[wasm_bindgen]` functions
//! below; DOM events, socket callbacks and timers reach it through
//! [`with_frontend`].

mod dom;
mod events;
mod services;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::app::{Frontend, Services};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::dropdowns::OptionData;
use crate::scheduler::Scheduler;
use crate::storage::{KeyValueStore, LocalStorageStore, MemoryStore};

use dom::DomSurface;
use services::{DomScheduler, FetchSuggestions, NavigatorClipboard, WebSocketTransport};

thread_local! {
    static FRONTEND: RefCell<Option<Frontend>> = const { RefCell::new(None) };
}

/// Run `f` on the front end. Returns `None` before start-up and when called
/// re-entrantly from inside another front end call (for example an `input`
/// event fired by a programmatic write); such events are dropped.
pub(crate) fn with_frontend<R>(f: impl FnOnce(&mut Frontend) -> R) -> Option<R> {
    FRONTEND.with(|cell| match cell.try_borrow_mut() {
        Ok(mut frontend) => frontend.as_mut().map(f),
        Err(_) => {
            log::trace!("[wasm] front end busy, dropping nested event");
            None
        }
    })
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    let store: Rc<dyn KeyValueStore> = match LocalStorageStore::new() {
        Ok(store) => Rc::new(store),
        Err(e) => {
            web_sys::console::warn_1(&format!("{}, settings will not persist", e).into());
            Rc::new(MemoryStore::new())
        }
    };
    let config = AppConfig::load_from_store(store.as_ref());
    if let Err(e) = console_log::init_with_level(config.preferences.log_level.to_level()) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }
    log::info!("cg front end starting (log level {})", config.preferences.log_level.name());

    let scheduler: Rc<dyn Scheduler> = Rc::new(DomScheduler::new());
    let suggestions = FetchSuggestions::new(config.suggest.base_url.clone());
    let ctx = AppContext::new(config, store, scheduler, dom::viewport());
    let services = Services {
        transport: Box::new(WebSocketTransport::new()),
        suggestions: Box::new(suggestions),
        surface: Box::new(DomSurface::new()),
        clipboard: Box::new(NavigatorClipboard),
    };

    let mut frontend = Frontend::new(ctx, services);
    frontend.render_all();
    FRONTEND.with(|cell| *cell.borrow_mut() = Some(frontend));

    events::install();
    with_frontend(|frontend| frontend.open_channel());
}

// =============================================================================
// Push channel
// =============================================================================

#[wasm_bindgen(js_name = openChannel)]
pub fn open_channel() {
    with_frontend(|frontend| frontend.open_channel());
}

#[wasm_bindgen(js_name = closeChannel)]
pub fn close_channel() {
    with_frontend(|frontend| frontend.close_channel());
}

// =============================================================================
// Overlays
// =============================================================================

#[wasm_bindgen(js_name = showLoading)]
pub fn show_loading() {
    with_frontend(|frontend| frontend.show_loading());
}

/// `result` is `"success"` or an error message.
#[wasm_bindgen(js_name = handleResponse)]
pub fn handle_response(result: String) {
    with_frontend(|frontend| frontend.handle_response(&result));
}

#[wasm_bindgen(js_name = showError)]
pub fn show_error(message: String) {
    with_frontend(|frontend| frontend.show_error(&message));
}

#[wasm_bindgen(js_name = showCustomOverlay)]
pub fn show_custom_overlay(message: String, image: Option<String>) {
    with_frontend(|frontend| frontend.show_custom_overlay(&message, image));
}

#[wasm_bindgen(js_name = closeCustomOverlay)]
pub fn close_custom_overlay() {
    with_frontend(|frontend| frontend.close_custom_overlay());
}

// =============================================================================
// Galleries and info box
// =============================================================================

/// Replace the gallery. Empty `seeds`/`tags` lists mean "not supplied".
#[wasm_bindgen(js_name = updateGallery)]
pub fn update_gallery(
    images: Vec<String>,
    seeds: Vec<String>,
    tags: Vec<String>,
) -> Result<(), JsValue> {
    let seeds = (!seeds.is_empty()).then_some(seeds);
    let tags = (!tags.is_empty()).then_some(tags);
    with_frontend(|frontend| frontend.update_gallery(images, seeds, tags))
        .unwrap_or(Ok(()))
        .map_err(to_js_error)
}

#[wasm_bindgen(js_name = appendImageData)]
pub fn append_image_data(data_uri: String, seed: String, tags: String, keep_gallery: bool) {
    with_frontend(|frontend| frontend.append_image_data(data_uri, seed, tags, keep_gallery));
}

#[wasm_bindgen(js_name = updateThumbGallery)]
pub fn update_thumb_gallery(images: Vec<String>) {
    with_frontend(|frontend| frontend.update_thumb_gallery(images));
}

#[wasm_bindgen(js_name = setInfoBox)]
pub fn set_info_box(title: Option<String>, content: String) {
    with_frontend(|frontend| frontend.set_info_box(title.as_deref(), &content));
}

// =============================================================================
// Dropdowns and prompt editing
// =============================================================================

/// `options_json` is `[[keys], [values]]` for the character dropdown or an
/// object of lists for the view dropdown.
#[wasm_bindgen(js_name = setDropdownOptions)]
pub fn set_dropdown_options(
    container: String,
    options_json: String,
    originals: Vec<String>,
    labels: Option<String>,
    defaults: Vec<String>,
    enable_search: Option<bool>,
) -> Result<(), JsValue> {
    let data: OptionData = serde_json::from_str(&options_json).map_err(to_js_error)?;
    with_frontend(|frontend| {
        frontend.set_dropdown_options(
            &container,
            &data,
            &originals,
            labels.as_deref(),
            &defaults,
            enable_search,
        )
    })
    .unwrap_or(Ok(()))
    .map_err(to_js_error)
}

#[wasm_bindgen(js_name = updateDropdownDefaults)]
pub fn update_dropdown_defaults(container: String, defaults: Vec<String>) {
    with_frontend(|frontend| frontend.update_dropdown_defaults(&container, &defaults));
}

#[wasm_bindgen(js_name = dropdownValue)]
pub fn dropdown_value(container: String) -> Vec<String> {
    with_frontend(|frontend| frontend.dropdown_value(&container)).unwrap_or_default()
}

/// Thumbnail shown while a character option is hovered. A non-string
/// `character` is ignored; a missing or empty `image_data` clears it.
#[wasm_bindgen(js_name = updateThumbOverlay)]
pub fn update_thumb_overlay(character: JsValue, image_data: JsValue) {
    let Some(character) = character.as_string() else {
        return;
    };
    with_frontend(|frontend| frontend.update_thumb_overlay(&character, image_data.as_string()));
}

#[wasm_bindgen(js_name = attachTagEditor)]
pub fn attach_tag_editor(input: String) {
    with_frontend(|frontend| frontend.attach_tag_editor(&input));
}

// =============================================================================
// Configuration
// =============================================================================

/// Current configuration as JSON.
#[wasm_bindgen(js_name = exportConfig)]
pub fn export_config() -> Result<String, JsValue> {
    with_frontend(|frontend| frontend.context().config.to_json())
        .unwrap_or_else(|| AppConfig::default().to_json())
        .map_err(to_js_error)
}

/// Validate and store a configuration; it applies on the next page load.
#[wasm_bindgen(js_name = importConfig)]
pub fn import_config(json: String) -> Result<(), JsValue> {
    let config = AppConfig::from_json(&json).map_err(to_js_error)?;
    let store = LocalStorageStore::new().map_err(to_js_error)?;
    config.save_to_store(&store).map_err(to_js_error)
}
