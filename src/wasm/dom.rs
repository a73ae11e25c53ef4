//! [`UiSurface`] on the page DOM.
//!
//! Elements are created on first use and looked up by id afterwards. No
//! element carries its own listener; `events` installs delegated handlers on
//! the document, so any node here can be rebuilt freely.

use cg_ui::tag_editor::place_suggestion_box;
use cg_ui::text_core::{byte_to_utf16, caret_offset, utf16_to_byte};
use cg_ui::{FieldWrite, Point, Rect, Size, TextEdit};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CustomEvent, CustomEventInit, Document, Element, Event, EventInit, HtmlElement,
    HtmlImageElement, HtmlInputElement, HtmlTextAreaElement, IntersectionObserver,
    IntersectionObserverEntry,
};

use super::with_frontend;
use crate::constants::PRIVACY_BALL_LABEL;
use crate::gallery::{GalleryCell, GalleryMode, GridLayout};
use crate::surface::{
    CustomRender, DropdownRender, ErrorRender, FullscreenRender, GalleryRender, InfoBoxRender,
    LoadingRender, PanelRender, PrivacyBallRender, ScrollTarget, SuggestionRender,
    ThumbOverlayRender, ThumbsRender, UiSurface,
};
use crate::thumbs::{ThumbGallery, ThumbMode};

// Host containers provided by the page
pub(super) const GALLERY_ID: &str = "cg-custom-gallery";
pub(super) const THUMBS_ID: &str = "cg-thumb-gallery";
pub(super) const SEED_INPUT_SELECTOR: &str = "#random_seed input";

// Elements owned by the front end
pub(super) const MODE_BUTTON_ID: &str = "cg-gallery-mode-button";
pub(super) const MAIN_CONTAINER_ID: &str = "cg-main-image-container";
pub(super) const MAIN_IMAGE_ID: &str = "cg-main-image";
pub(super) const STRIP_ID: &str = "cg-preview-container";
pub(super) const GRID_ID: &str = "cg-gallery-grid";
pub(super) const FULLSCREEN_ID: &str = "cg-fullscreen-overlay";
pub(super) const FULLSCREEN_IMAGE_ID: &str = "cg-fullscreen-image";
pub(super) const LOADING_ID: &str = "cg-loading-overlay";
pub(super) const ERROR_ID: &str = "cg-error-overlay";
pub(super) const CUSTOM_ID: &str = "cg-custom-overlay";
pub(super) const PANEL_ID: &str = "cg-button-overlay";
pub(super) const INFO_ID: &str = "cg-info-box";
pub(super) const PRIVACY_BUTTON_ID: &str = "cg-privacy-button";
pub(super) const THUMB_OVERLAY_ID: &str = "cg-thumb-overlay";

pub(super) const STRIP_IMAGE_CLASS: &str = "cg-preview-image";
pub(super) const GRID_ITEM_CLASS: &str = "cg-gallery-item";
pub(super) const COPY_SEED_CLASS: &str = "cg-copy-seed";
pub(super) const COPY_TAGS_CLASS: &str = "cg-copy-tags";
pub(super) const THUMB_TOGGLE_CLASS: &str = "cg-thumb-toggle";
pub(super) const MINIMIZE_CLASS: &str = "cg-minimize-button";
pub(super) const CLOSE_CLASS: &str = "cg-close-button";
pub(super) const RESIZE_HANDLE_CLASS: &str = "cg-resize-handle";
pub(super) const DROPDOWN_FIELD_CLASS: &str = "mydropdown-field";
pub(super) const DROPDOWN_INPUT_CLASS: &str = "mydropdown-input";
pub(super) const DROPDOWN_ITEM_CLASS: &str = "mydropdown-item";
pub(super) const SUGGESTION_ITEM_CLASS: &str = "suggestion-item";
pub(super) const DROPDOWN_OPTIONS_CLASS: &str = "mydropdown-options";
pub(super) const PRIVACY_BALL_CLASS: &str = "cg-privacy-ball";

pub(super) fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn by_id<T: JsCast>(id: &str) -> Option<T> {
    document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn create<T: JsCast>(doc: &Document, tag: &str) -> Option<T> {
    doc.create_element(tag).ok()?.dyn_into::<T>().ok()
}

/// Element `id`, created as a `tag` child of `parent` when missing.
fn ensure(doc: &Document, parent: &Element, id: &str, tag: &str) -> Option<HtmlElement> {
    if let Some(existing) = doc.get_element_by_id(id) {
        return existing.dyn_into().ok();
    }
    let element: HtmlElement = create(doc, tag)?;
    element.set_id(id);
    parent.append_child(&element).ok()?;
    Some(element)
}

fn ensure_on_body(id: &str) -> Option<HtmlElement> {
    let doc = document()?;
    let body = doc.body()?;
    ensure(&doc, &body, id, "div")
}

fn remove(id: &str) {
    if let Some(element) = document().and_then(|doc| doc.get_element_by_id(id)) {
        element.remove();
    }
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(e) = element.style().set_property(property, value) {
        log::debug!("[dom] failed to set {}: {:?}", property, e);
    }
}

fn place(element: &HtmlElement, position: Point) {
    set_style(element, "left", &format!("{}px", position.x));
    set_style(element, "top", &format!("{}px", position.y));
}

fn set_class(element: &Element, class: &str, on: bool) {
    let _ = element.class_list().toggle_with_force(class, on);
}

/// Fire a bubbling `input` event so the page framework sees a programmatic
/// value change.
fn notify_input(target: &Element) {
    let init = EventInit::new();
    init.set_bubbles(true);
    match Event::new_with_event_init_dict("input", &init) {
        Ok(event) => {
            let _ = target.dispatch_event(&event);
        }
        Err(e) => log::debug!("[dom] failed to create input event: {:?}", e),
    }
}

fn dispatch_custom(target: &Element, name: &str, detail: &JsValue) {
    let init = CustomEventInit::new();
    init.set_bubbles(true);
    init.set_detail(detail);
    match CustomEvent::new_with_event_init_dict(name, &init) {
        Ok(event) => {
            let _ = target.dispatch_event(&event);
        }
        Err(e) => log::debug!("[dom] failed to create {}: {:?}", name, e),
    }
}

/// Text control of a prompt: either the element itself or the first
/// `textarea`/`input` inside it.
enum TextControl {
    Area(HtmlTextAreaElement),
    Input(HtmlInputElement),
}

impl TextControl {
    fn find(id: &str) -> Option<Self> {
        let element = document()?.get_element_by_id(id)?;
        Self::from_element(element.clone()).or_else(|| {
            let inner = element.query_selector("textarea, input").ok()??;
            Self::from_element(inner)
        })
    }

    fn from_selector(selector: &str) -> Option<Self> {
        Self::from_element(document()?.query_selector(selector).ok()??)
    }

    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlTextAreaElement>() {
            Ok(area) => Some(TextControl::Area(area)),
            Err(element) => element.dyn_into::<HtmlInputElement>().ok().map(TextControl::Input),
        }
    }

    fn element(&self) -> &HtmlElement {
        match self {
            TextControl::Area(area) => area,
            TextControl::Input(input) => input,
        }
    }

    fn value(&self) -> String {
        match self {
            TextControl::Area(area) => area.value(),
            TextControl::Input(input) => input.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            TextControl::Area(area) => area.set_value(value),
            TextControl::Input(input) => input.set_value(value),
        }
    }

    /// Selection start in UTF-16 code units.
    fn selection_start(&self) -> Option<u32> {
        match self {
            TextControl::Area(area) => area.selection_start().ok().flatten(),
            TextControl::Input(input) => input.selection_start().ok().flatten(),
        }
    }

    fn set_caret(&self, utf16: u32) {
        let _ = match self {
            TextControl::Area(area) => area.set_selection_range(utf16, utf16),
            TextControl::Input(input) => input.set_selection_range(utf16, utf16),
        };
    }
}

/// Byte-offset selection of the prompt `id`.
pub(super) fn selection_bytes(id: &str) -> Option<(usize, usize)> {
    let control = TextControl::find(id)?;
    let value = control.value();
    let (start, end) = match &control {
        TextControl::Area(area) => (
            area.selection_start().ok().flatten()?,
            area.selection_end().ok().flatten()?,
        ),
        TextControl::Input(input) => (
            input.selection_start().ok().flatten()?,
            input.selection_end().ok().flatten()?,
        ),
    };
    Some((
        utf16_to_byte(&value, start as usize),
        utf16_to_byte(&value, end as usize),
    ))
}

fn suggestion_box_id(input: &str) -> String {
    format!("{}-suggestions", input)
}

/// Id of the hidden text field a dropdown slot writes into.
fn bound_field_id(container: &str, index: usize) -> String {
    format!("{}-value-{}", container, index)
}

/// Current window size.
pub(super) fn viewport() -> Size {
    let Some(window) = web_sys::window() else {
        return Size::default();
    };
    let read = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0) as f32
    };
    Size::new(read(window.inner_width()), read(window.inner_height()))
}

/// Bounds of the gallery container.
pub(super) fn gallery_rect() -> Option<Rect> {
    let rect = by_id::<Element>(GALLERY_ID)?.get_bounding_client_rect();
    Some(Rect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    ))
}

fn ball_element_id(id: u32) -> String {
    format!("{}-{}", PRIVACY_BALL_CLASS, id)
}

/// Browser [`UiSurface`].
pub struct DomSurface {
    /// Loads `data-src` of gallery images once they scroll into view
    observer: Option<IntersectionObserver>,
    _observer_callback: Option<Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>>,
}

impl DomSurface {
    pub fn new() -> Self {
        let callback = Closure::wrap(Box::new(
            |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if let (Ok(image), Some(src)) = (
                        target.clone().dyn_into::<HtmlImageElement>(),
                        target.get_attribute("data-src"),
                    ) {
                        image.set_src(&src);
                        let _ = target.remove_attribute("data-src");
                    }
                    observer.unobserve(&target);
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => Self {
                observer: Some(observer),
                _observer_callback: Some(callback),
            },
            Err(e) => {
                log::warn!("[dom] IntersectionObserver unavailable, loading eagerly: {:?}", e);
                Self {
                    observer: None,
                    _observer_callback: None,
                }
            }
        }
    }

    fn lazy_image(&self, doc: &Document, cell: &GalleryCell, class: &str) -> Option<HtmlImageElement> {
        let image: HtmlImageElement = create(doc, "img")?;
        image.set_class_name(class);
        image.set_alt("");
        let _ = image.set_attribute("data-index", &cell.index.to_string());
        match &self.observer {
            Some(observer) => {
                let _ = image.set_attribute("data-src", &cell.data_uri);
                observer.observe(&image);
            }
            None => image.set_src(&cell.data_uri),
        }
        Some(image)
    }

    /// Mode switch and privacy buttons, shown in both gallery modes.
    fn mode_button(&self, doc: &Document, gallery: &Element, label: &str) -> Option<()> {
        let button = ensure(doc, gallery, MODE_BUTTON_ID, "button")?;
        button.set_text_content(Some(label));

        if doc.get_element_by_id(PRIVACY_BUTTON_ID).is_none() {
            let privacy = ensure(doc, gallery, PRIVACY_BUTTON_ID, "button")?;
            privacy.set_class_name("cg-button");
            privacy.set_text_content(Some("(X)"));
            set_style(&privacy, "top", "50px");
            set_style(&privacy, "left", "10px");
            set_style(
                &privacy,
                "background",
                "linear-gradient(45deg, red, orange, yellow, green, blue, indigo, violet)",
            );
        }
        Some(())
    }

    fn render_split(&self, doc: &Document, gallery: &HtmlElement, render: &GalleryRender) -> Option<()> {
        remove(GRID_ID);
        self.mode_button(doc, gallery, &render.label)?;

        let main = ensure(doc, gallery, MAIN_CONTAINER_ID, "div")?;
        let image: HtmlImageElement = match doc.get_element_by_id(MAIN_IMAGE_ID) {
            Some(existing) => existing.dyn_into().ok()?,
            None => {
                let image: HtmlImageElement = create(doc, "img")?;
                image.set_id(MAIN_IMAGE_ID);
                main.append_child(&image).ok()?;
                for (class, text) in [(COPY_SEED_CLASS, "Seed"), (COPY_TAGS_CLASS, "Tags")] {
                    let button: HtmlElement = create(doc, "button")?;
                    button.set_class_name(class);
                    button.set_text_content(Some(text));
                    main.append_child(&button).ok()?;
                }
                image
            }
        };
        match &render.focused {
            Some(cell) => {
                image.set_src(&cell.data_uri);
                let _ = image.set_attribute("data-index", &cell.index.to_string());
                set_style(&main, "display", "");
            }
            None => set_style(&main, "display", "none"),
        }

        let strip = ensure(doc, gallery, STRIP_ID, "div")?;
        if render.batch.replace {
            strip.set_inner_html("");
            for cell in &render.batch.cells {
                let thumb = self.lazy_image(doc, cell, STRIP_IMAGE_CLASS)?;
                strip.append_child(&thumb).ok()?;
            }
        } else {
            // Newest first: prepend oldest of the batch first
            for cell in render.batch.cells.iter().rev() {
                let thumb = self.lazy_image(doc, cell, STRIP_IMAGE_CLASS)?;
                strip.prepend_with_node_1(&thumb).ok()?;
            }
        }

        let focused = render.focused.as_ref().map(|cell| cell.index.to_string());
        let children = strip.children();
        for i in 0..children.length() {
            if let Some(child) = children.item(i) {
                let active = focused.is_some() && child.get_attribute("data-index") == focused;
                set_class(&child, "active", active);
            }
        }
        Some(())
    }

    fn render_grid(&self, doc: &Document, gallery: &HtmlElement, render: &GalleryRender, layout: &GridLayout) -> Option<()> {
        remove(MAIN_CONTAINER_ID);
        remove(STRIP_ID);
        self.mode_button(doc, gallery, &render.label)?;

        let grid = ensure(doc, gallery, GRID_ID, "div")?;
        set_style(&grid, "display", "grid");
        set_style(&grid, "grid-template-columns", &layout.template_columns());
        if render.batch.replace {
            grid.set_inner_html("");
        }

        let mut items = Vec::with_capacity(render.batch.cells.len());
        for cell in &render.batch.cells {
            let item: HtmlElement = create(doc, "div")?;
            item.set_class_name(GRID_ITEM_CLASS);
            let _ = item.set_attribute("data-index", &cell.index.to_string());
            set_style(&item, "width", &format!("{}px", layout.cell_width));
            set_style(&item, "height", &format!("{}px", layout.cell_height));
            item.append_child(&self.lazy_image(doc, cell, "")?).ok()?;
            items.push(item);
        }
        if render.batch.replace {
            for item in &items {
                grid.append_child(item).ok()?;
            }
        } else {
            for item in items.iter().rev() {
                grid.prepend_with_node_1(item).ok()?;
            }
        }

        if let Some(newest) = render.batch.cells.first() {
            measure_aspect(&newest.data_uri);
        }
        Some(())
    }

    fn ensure_loading(&self) -> Option<HtmlElement> {
        let overlay = ensure_on_body(LOADING_ID)?;
        if overlay.child_element_count() == 0 {
            overlay.set_inner_html(
                "<img class=\"cg-loading-image\" alt=\"\">\
                 <div class=\"cg-loading-message\"></div>\
                 <div class=\"cg-loading-timer\"></div>",
            );
        }
        Some(overlay)
    }

    fn render_suggestion_box(&self, input: &str, render: &SuggestionRender) -> Option<()> {
        let doc = document()?;
        let body = doc.body()?;
        let container = ensure(&doc, &body, &suggestion_box_id(input), "div")?;
        container.set_class_name("suggestion-box");
        let _ = container.set_attribute("data-input", input);
        container.set_inner_html("");
        for (index, markup) in render.items.iter().enumerate() {
            let item: HtmlElement = create(&doc, "div")?;
            item.set_class_name(SUGGESTION_ITEM_CLASS);
            set_class(&item, "selected", render.selected == Some(index));
            let _ = item.set_attribute("data-index", &index.to_string());
            item.set_inner_html(markup);
            container.append_child(&item).ok()?;
        }
        set_style(&container, "width", &format!("{}px", render.width));
        set_style(&container, "display", "block");

        let control = TextControl::find(input)?;
        let rect = control.element().get_bounding_client_rect();
        let window = web_sys::window()?;
        let scroll = Point::new(
            window.scroll_x().unwrap_or(0.0) as f32,
            window.scroll_y().unwrap_or(0.0) as f32,
        );
        let value = control.value();
        let cursor = utf16_to_byte(&value, control.selection_start().unwrap_or(0) as usize);
        let (caret_x, _) = caret_offset(
            &value,
            cursor,
            cg_ui::constants::DEFAULT_FONT_SIZE,
            rect.width() as f32,
        );
        let input_rect = Rect::new(
            rect.left() as f32 + scroll.x,
            rect.top() as f32 + scroll.y,
            rect.width() as f32,
            rect.height() as f32,
        );
        let size = Size::new(
            container.offset_width() as f32,
            container.offset_height() as f32,
        );
        place(
            &container,
            place_suggestion_box(input_rect, caret_x, size, viewport(), scroll),
        );
        Some(())
    }

    fn build_dropdown(&self, doc: &Document, container: &Element, render: &DropdownRender) -> Option<()> {
        let fields = container.get_elements_by_class_name(DROPDOWN_FIELD_CLASS);
        if fields.length() as usize != render.labels.len() {
            container.set_inner_html("");
            for index in 0..render.labels.len() {
                let field: HtmlElement = create(doc, "div")?;
                field.set_class_name(DROPDOWN_FIELD_CLASS);
                let _ = field.set_attribute("data-index", &index.to_string());
                let label: HtmlElement = create(doc, "label")?;
                field.append_child(&label).ok()?;
                let input: HtmlInputElement = create(doc, "input")?;
                input.set_class_name(DROPDOWN_INPUT_CLASS);
                let _ = input.set_attribute("data-index", &index.to_string());
                field.append_child(&input).ok()?;
                container.append_child(&field).ok()?;
            }
            let list: HtmlElement = create(doc, "div")?;
            list.set_class_name(DROPDOWN_OPTIONS_CLASS);
            container.append_child(&list).ok()?;
        }
        Some(())
    }

    fn update_dropdown(&self, doc: &Document, container: &Element, render: &DropdownRender) -> Option<()> {
        let focused = doc.active_element();
        let fields = container.get_elements_by_class_name(DROPDOWN_FIELD_CLASS);
        for index in 0..fields.length() {
            let field = fields.item(index)?;
            let i = index as usize;
            set_class(&field, "active", render.active == Some(i));
            if let Some(label) = field.query_selector("label").ok().flatten() {
                label.set_text_content(render.labels.get(i).map(String::as_str));
            }
            let input: HtmlInputElement = field
                .query_selector("input")
                .ok()
                .flatten()?
                .dyn_into()
                .ok()?;
            input.set_read_only(!render.searchable);
            let has_focus = focused
                .as_ref()
                .is_some_and(|f| f.is_same_node(Some(input.as_ref())));
            if !has_focus {
                input.set_value(render.displayed.get(i).map(String::as_str).unwrap_or(""));
            }
        }

        let list: HtmlElement = container
            .query_selector(&format!(".{}", DROPDOWN_OPTIONS_CLASS))
            .ok()
            .flatten()?
            .dyn_into()
            .ok()?;
        list.set_inner_html("");
        if render.open {
            for (key, label) in &render.items {
                let item: HtmlElement = create(doc, "div")?;
                item.set_class_name(DROPDOWN_ITEM_CLASS);
                let _ = item.set_attribute("data-key", key);
                item.set_inner_text(label);
                list.append_child(&item).ok()?;
            }
        }
        set_style(&list, "display", if render.open { "block" } else { "none" });
        Some(())
    }
}

/// Load `data_uri` off-screen and report its aspect ratio.
fn measure_aspect(data_uri: &str) {
    let Ok(probe) = HtmlImageElement::new() else {
        return;
    };
    let measured = probe.clone();
    let onload = Closure::once_into_js(move || {
        let (width, height) = (measured.natural_width(), measured.natural_height());
        if height > 0 {
            let aspect = width as f32 / height as f32;
            with_frontend(|frontend| frontend.grid_measured(aspect));
        }
    });
    probe.set_onload(Some(onload.unchecked_ref()));
    probe.set_src(data_uri);
}

impl UiSurface for DomSurface {
    fn render_gallery(&mut self, render: &GalleryRender) {
        let Some(doc) = document() else {
            return;
        };
        let Some(gallery) = by_id::<HtmlElement>(GALLERY_ID) else {
            log::warn!("[dom] no #{} container", GALLERY_ID);
            return;
        };
        let done = match (render.mode, &render.grid) {
            (GalleryMode::Grid, Some(layout)) => self.render_grid(&doc, &gallery, render, layout),
            _ => self.render_split(&doc, &gallery, render),
        };
        if done.is_none() {
            log::warn!("[dom] gallery render incomplete");
        }
    }

    fn render_fullscreen(&mut self, render: Option<&FullscreenRender>) {
        let Some(render) = render else {
            remove(FULLSCREEN_ID);
            return;
        };
        let Some(doc) = document() else {
            return;
        };
        let Some(overlay) = ensure_on_body(FULLSCREEN_ID) else {
            return;
        };
        let Some(image) = ensure(&doc, &overlay, FULLSCREEN_IMAGE_ID, "img") else {
            return;
        };
        if let Ok(image) = image.dyn_into::<HtmlImageElement>() {
            if image.src() != render.data_uri {
                image.set_src(&render.data_uri);
            }
            set_style(&image, "transform", &render.transform);
            let _ = image.set_attribute("data-index", &render.index.to_string());
        }
    }

    fn render_thumbs(&mut self, render: Option<&ThumbsRender>) {
        let Some(container) = by_id::<HtmlElement>(THUMBS_ID) else {
            return;
        };
        container.set_inner_html("");
        let Some(render) = render else {
            return;
        };
        let Some(doc) = document() else {
            return;
        };

        let scroll = render.mode == ThumbMode::Scroll;
        set_class(&container, "scroll-mode", scroll);
        if let Some(button) = create::<HtmlElement>(&doc, "button") {
            button.set_class_name(THUMB_TOGGLE_CLASS);
            button.set_text_content(Some(if scroll { "Grid" } else { "Scroll" }));
            let _ = container.append_child(&button);
        }
        let cell = ThumbGallery::cell_size(container.client_height() as f32, 1.0);
        for data_uri in &render.images {
            let Some(image) = create::<HtmlImageElement>(&doc, "img") else {
                continue;
            };
            image.set_src(data_uri);
            if !scroll && cell.height > 0.0 {
                set_style(&image, "height", &format!("{}px", cell.height));
            }
            let _ = container.append_child(&image);
        }
    }

    fn render_loading(&mut self, render: Option<&LoadingRender>) {
        let Some(render) = render else {
            remove(LOADING_ID);
            return;
        };
        let Some(overlay) = self.ensure_loading() else {
            return;
        };
        place(&overlay, render.position);
        let parts = (
            overlay.query_selector(".cg-loading-image").ok().flatten(),
            overlay.query_selector(".cg-loading-message").ok().flatten(),
            overlay.query_selector(".cg-loading-timer").ok().flatten(),
        );
        if let (Some(image), Some(message), Some(timer)) = parts {
            if let Ok(image) = image.dyn_into::<HtmlImageElement>() {
                match &render.preview {
                    Some(uri) if image.src() != *uri => image.set_src(uri),
                    Some(_) => {}
                    None => {
                        let _ = image.remove_attribute("src");
                    }
                }
                set_class(&image, "waiting", render.preview.is_none());
            }
            message.set_text_content(Some(&render.message));
            timer.set_text_content(Some(&render.elapsed));
        }
    }

    fn render_error(&mut self, render: Option<&ErrorRender>) {
        match render.and_then(|render| Some((render, ensure_on_body(ERROR_ID)?))) {
            Some((render, overlay)) => overlay.set_inner_html(&render.html),
            None => remove(ERROR_ID),
        }
    }

    fn render_custom(&mut self, render: Option<&CustomRender>) {
        let Some(render) = render else {
            remove(CUSTOM_ID);
            return;
        };
        let Some(overlay) = ensure_on_body(CUSTOM_ID) else {
            return;
        };
        place(&overlay, render.position);
        set_style(&overlay, "width", &format!("{}px", render.size.width));
        set_style(&overlay, "height", &format!("{}px", render.size.height));

        let image = render
            .image
            .as_ref()
            .map(|uri| format!("<img class=\"cg-custom-image\" src=\"{}\" alt=\"\">", uri))
            .unwrap_or_default();
        overlay.set_inner_html(&format!(
            "<button class=\"{}\">&times;</button>{}<div class=\"cg-custom-content\">{}</div><div class=\"{}\"></div>",
            CLOSE_CLASS, image, render.html, RESIZE_HANDLE_CLASS
        ));
    }

    fn render_panel(&mut self, render: &PanelRender) {
        let Some(doc) = document() else {
            return;
        };
        let Some(panel) = ensure_on_body(PANEL_ID) else {
            return;
        };
        if panel.get_elements_by_class_name(MINIMIZE_CLASS).length() == 0 {
            if let Some(button) = create::<HtmlElement>(&doc, "button") {
                button.set_class_name(MINIMIZE_CLASS);
                let _ = panel.prepend_with_node_1(&button);
            }
        }
        if let Some(button) = panel.get_elements_by_class_name(MINIMIZE_CLASS).item(0) {
            button.set_text_content(Some(if render.minimized { "+" } else { "-" }));
        }
        place(&panel, render.position);
        set_class(&panel, "minimized", render.minimized);
        set_style(&panel, "display", if render.visible { "" } else { "none" });
    }

    fn render_privacy(&mut self, balls: &[PrivacyBallRender]) {
        let Some(doc) = document() else {
            return;
        };
        let Some(body) = doc.body() else {
            return;
        };
        // The collection is live; collect before removing
        let existing = doc.get_elements_by_class_name(PRIVACY_BALL_CLASS);
        let stale: Vec<Element> = (0..existing.length())
            .filter_map(|i| existing.item(i))
            .filter(|element| !balls.iter().any(|ball| ball_element_id(ball.id) == element.id()))
            .collect();
        for element in stale {
            element.remove();
        }

        for ball in balls {
            let Some(element) = ensure(&doc, &body, &ball_element_id(ball.id), "div") else {
                continue;
            };
            if element.class_name() != PRIVACY_BALL_CLASS {
                element.set_class_name(PRIVACY_BALL_CLASS);
                let _ = element.set_attribute("data-ball", &ball.id.to_string());
                element.set_text_content(Some(PRIVACY_BALL_LABEL));
                set_style(&element, "position", "fixed");
            }
            place(&element, ball.position);
            set_style(&element, "width", &format!("{}px", ball.size));
            set_style(&element, "height", &format!("{}px", ball.size));
            set_style(&element, "font-size", &format!("{}px", ball.font_size));
            set_style(&element, "cursor", if ball.dragging { "grabbing" } else { "grab" });
        }
        let dragging = balls.iter().any(|ball| ball.dragging);
        set_style(&body, "user-select", if dragging { "none" } else { "" });
    }

    fn render_thumb_overlay(&mut self, render: Option<&ThumbOverlayRender>) {
        let Some(doc) = document() else {
            return;
        };
        let Some(overlay) = ensure_on_body(THUMB_OVERLAY_ID) else {
            return;
        };
        let Some(render) = render else {
            set_style(&overlay, "display", "none");
            return;
        };
        overlay.set_class_name("cg-overlay cg-thumb-overlay");
        set_style(&overlay, "position", "fixed");
        set_style(&overlay, "z-index", "10003");
        set_style(&overlay, "background", "rgba(0, 0, 0, 0.5)");
        place(&overlay, render.position);

        let image: Option<HtmlImageElement> = match overlay.query_selector("img").ok().flatten() {
            Some(existing) => existing.dyn_into().ok(),
            None => {
                let image = create::<HtmlImageElement>(&doc, "img");
                if let Some(image) = &image {
                    let _ = overlay.append_child(image);
                }
                image
            }
        };
        if let Some(image) = image {
            if image.src() != render.image {
                image.set_src(&render.image);
            }
            set_style(&image, "max-width", "100%");
            set_style(&image, "max-height", "100%");
            set_style(&image, "object-fit", "contain");
        }
        set_style(&overlay, "display", "block");
    }

    fn render_scroll_drag(&mut self, target: ScrollTarget, scroll_left: Option<f32>) {
        let id = match target {
            ScrollTarget::Filmstrip => STRIP_ID,
            ScrollTarget::Thumbs => THUMBS_ID,
        };
        let Some(strip) = by_id::<HtmlElement>(id) else {
            return;
        };
        let body = document().and_then(|doc| doc.body());
        match scroll_left {
            Some(left) => {
                strip.set_scroll_left(left.round() as i32);
                set_style(&strip, "cursor", "grabbing");
                if let Some(body) = &body {
                    set_style(body, "user-select", "none");
                }
            }
            None => {
                set_style(&strip, "cursor", "grab");
                if let Some(body) = &body {
                    set_style(body, "user-select", "");
                }
            }
        }
    }

    fn render_info_box(&mut self, render: &InfoBoxRender) {
        let Some(container) = by_id::<HtmlElement>(INFO_ID) else {
            return;
        };
        container.set_inner_html(&format!(
            "<div class=\"cg-info-title\"></div><div class=\"cg-info-content\">{}</div>",
            render.html
        ));
        if let Some(title) = container.query_selector(".cg-info-title").ok().flatten() {
            title.set_text_content(Some(&render.title));
        }
    }

    fn render_suggestions(&mut self, input: &str, render: Option<&SuggestionRender>) {
        match render {
            Some(render) => {
                if self.render_suggestion_box(input, render).is_none() {
                    log::debug!("[suggest] could not place box for '{}'", input);
                }
            }
            None => {
                if let Some(container) = by_id::<HtmlElement>(&suggestion_box_id(input)) {
                    set_style(&container, "display", "none");
                    container.set_inner_html("");
                }
            }
        }
    }

    fn render_dropdown(&mut self, container: &str, render: &DropdownRender) {
        let Some(doc) = document() else {
            return;
        };
        let Some(element) = doc.get_element_by_id(container) else {
            log::warn!("[dropdown] no #{} container", container);
            return;
        };
        if self
            .build_dropdown(&doc, &element, render)
            .and_then(|_| self.update_dropdown(&doc, &element, render))
            .is_none()
        {
            log::warn!("[dropdown] render of '{}' incomplete", container);
        }
    }

    fn input_state(&self, input: &str) -> Option<(String, usize)> {
        let control = TextControl::find(input)?;
        let value = control.value();
        let cursor = utf16_to_byte(&value, control.selection_start().unwrap_or(0) as usize);
        Some((value, cursor))
    }

    fn write_input(&mut self, input: &str, edit: &TextEdit) {
        let Some(control) = TextControl::find(input) else {
            return;
        };
        control.set_value(&edit.text);
        control.set_caret(byte_to_utf16(&edit.text, edit.cursor) as u32);
        notify_input(control.element());
    }

    fn write_field(&mut self, container: &str, write: &FieldWrite) {
        let Some(control) = TextControl::find(&bound_field_id(container, write.index)) else {
            log::debug!("[dropdown] no bound field {} in '{}'", write.index, container);
            return;
        };
        control.set_value(&write.value);
        notify_input(control.element());
    }

    fn dropdown_changed(&mut self, container: &str, values: &[String]) {
        let Some(element) = document().and_then(|doc| doc.get_element_by_id(container)) else {
            return;
        };
        let detail: js_sys::Array = values.iter().map(|v| JsValue::from_str(v)).collect();
        dispatch_custom(&element, "cg-dropdown-change", &detail);
    }

    fn hover_preview(&mut self, container: &str, key: Option<&str>) {
        let Some(element) = document().and_then(|doc| doc.get_element_by_id(container)) else {
            return;
        };
        let detail = key.map(JsValue::from_str).unwrap_or(JsValue::NULL);
        dispatch_custom(&element, "cg-dropdown-hover", &detail);
    }

    fn seed_input(&self) -> Option<i64> {
        TextControl::from_selector(SEED_INPUT_SELECTOR)?
            .value()
            .trim()
            .parse()
            .ok()
    }

    fn set_seed_input(&mut self, seed: i64) {
        if let Some(control) = TextControl::from_selector(SEED_INPUT_SELECTOR) {
            control.set_value(&seed.to_string());
            notify_input(control.element());
        }
    }

    fn gallery_width(&self) -> f32 {
        by_id::<HtmlElement>(GALLERY_ID)
            .map(|gallery| gallery.client_width() as f32)
            .unwrap_or(0.0)
    }
}
