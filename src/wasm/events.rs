//! Delegated DOM listeners feeding page input into the front end.

use std::cell::Cell;

use cg_ui::{Key, Modifiers, MouseButton, Point, Rect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget, KeyboardEvent, MouseEvent, WheelEvent};

use super::dom::{self, document};
use super::with_frontend;
use crate::app::Frontend;
use crate::dropdowns::{CHARACTER_CONTAINER, VIEW_CONTAINER};
use crate::overlay::{DragTarget, HoverAnchor};
use crate::surface::ScrollTarget;

thread_local! {
    /// Mouse went down on the button panel
    static PANEL_PRESSED: Cell<bool> = const { Cell::new(false) };
    /// The panel press turned into a drag; swallow the click it produces
    static SUPPRESS_PANEL_CLICK: Cell<bool> = const { Cell::new(false) };
}

fn listen(
    target: &EventTarget,
    name: &str,
    options: Option<&AddEventListenerOptions>,
    handler: impl FnMut(Event) + 'static,
) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    let result = match options {
        Some(options) => target.add_event_listener_with_callback_and_add_event_listener_options(
            name,
            closure.as_ref().unchecked_ref(),
            options,
        ),
        None => target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref()),
    };
    if let Err(e) = result {
        log::error!("[events] failed to listen for {}: {:?}", name, e);
    }
    closure.forget();
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn closest(element: &Element, selector: &str) -> Option<Element> {
    element.closest(selector).ok().flatten()
}

fn within(element: &Element, selector: &str) -> bool {
    closest(element, selector).is_some()
}

fn index_attr(element: &Element) -> Option<usize> {
    element.get_attribute("data-index")?.parse().ok()
}

fn pointer(event: &MouseEvent) -> Point {
    Point::new(event.client_x() as f32, event.client_y() as f32)
}

/// Editor input that contains `element`, if any.
fn editor_for(frontend: &Frontend, element: &Element) -> Option<String> {
    frontend
        .editor_inputs()
        .into_iter()
        .find(|input| within(element, &format!("#{}", input)))
}

fn ball_id(element: &Element) -> Option<u32> {
    closest(element, &format!(".{}", dom::PRIVACY_BALL_CLASS))?
        .get_attribute("data-ball")?
        .parse()
        .ok()
}

/// Strip under `element` that scrolls by dragging.
fn scroll_strip(element: &Element) -> Option<(ScrollTarget, Element)> {
    if let Some(strip) = closest(element, &format!("#{}", dom::STRIP_ID)) {
        return Some((ScrollTarget::Filmstrip, strip));
    }
    closest(element, &format!("#{}.scroll-mode", dom::THUMBS_ID))
        .map(|strip| (ScrollTarget::Thumbs, strip))
}

/// Whether `related` (the element the pointer moved to) is outside `parent`.
fn left_element(mouse: &MouseEvent, parent: &Element) -> bool {
    !mouse
        .related_target()
        .and_then(|related| related.dyn_into::<Element>().ok())
        .is_some_and(|related| parent.contains(Some(related.as_ref())))
}

fn dropdown_container(element: &Element) -> Option<Element> {
    closest(
        element,
        &format!("#{}, #{}", CHARACTER_CONTAINER, VIEW_CONTAINER),
    )
}

/// Install every listener. Called once at start-up.
pub(super) fn install() {
    let Some(doc) = document() else {
        log::error!("[events] no document");
        return;
    };
    let Some(window) = web_sys::window() else {
        return;
    };

    let capture = AddEventListenerOptions::new();
    capture.set_capture(true);
    let active = AddEventListenerOptions::new();
    active.set_passive(false);

    listen(&doc, "click", Some(&capture), on_click);
    listen(&doc, "keydown", Some(&capture), on_keydown);
    listen(&doc, "input", None, on_input);
    listen(&doc, "mousedown", None, on_mouse_down);
    listen(&doc, "mousemove", None, on_mouse_move);
    listen(&doc, "mouseup", None, on_mouse_up);
    listen(&doc, "wheel", Some(&active), on_wheel);
    listen(&doc, "mouseover", None, on_mouse_over);
    listen(&doc, "mouseout", None, on_mouse_out);
    listen(&doc, "dblclick", None, on_double_click);
    listen(&doc, "contextmenu", None, on_context_menu);
    // Image load errors do not bubble
    listen(&doc, "error", Some(&capture), on_image_error);
    listen(&window, "resize", None, |_| {
        with_frontend(|frontend| frontend.viewport_resized(dom::viewport()));
    });
}

fn on_click(event: Event) {
    let Some(target) = target_element(&event) else {
        return;
    };
    if SUPPRESS_PANEL_CLICK.with(|flag| flag.replace(false))
        && within(&target, &format!("#{}", dom::PANEL_ID))
    {
        event.prevent_default();
        event.stop_propagation();
        return;
    }
    let right_half = event.dyn_ref::<MouseEvent>().map(|mouse| {
        let rect = target.get_bounding_client_rect();
        mouse.client_x() as f64 > rect.left() + rect.width() / 2.0
    });

    with_frontend(|frontend| {
        for input in frontend.editor_inputs() {
            let inside = within(&target, &format!("#{}", input))
                || within(&target, &format!("#{}-suggestions", input));
            frontend.editor_click(&input, inside);
        }

        if let Some(item) = closest(&target, &format!(".{}", dom::SUGGESTION_ITEM_CLASS)) {
            let input = closest(&item, "[data-input]").and_then(|b| b.get_attribute("data-input"));
            if let (Some(input), Some(index)) = (input, index_attr(&item)) {
                frontend.accept_suggestion(&input, index);
            }
            return;
        }

        match dropdown_container(&target) {
            Some(container) => {
                let id = container.id();
                if let Some(item) = closest(&target, &format!(".{}", dom::DROPDOWN_ITEM_CLASS)) {
                    if let Some(key) = item.get_attribute("data-key") {
                        frontend.dropdown_select(&id, &key);
                    }
                } else if let Some(field) =
                    closest(&target, &format!(".{}", dom::DROPDOWN_FIELD_CLASS))
                {
                    if let Some(index) = index_attr(&field) {
                        frontend.dropdown_click_field(&id, index);
                    }
                }
                return;
            }
            None => frontend.dropdown_click_outside(),
        }

        if target.id() == dom::PRIVACY_BUTTON_ID {
            if let Some(gallery) = dom::gallery_rect() {
                frontend.spawn_privacy_ball(gallery);
            }
        } else if target.id() == dom::MODE_BUTTON_ID {
            frontend.toggle_gallery_mode();
        } else if target.id() == dom::MAIN_IMAGE_ID {
            if let Some(index) = frontend.gallery_view().focus() {
                frontend.open_fullscreen(index);
            }
        } else if target.id() == dom::MAIN_CONTAINER_ID {
            frontend.gallery_side_click(right_half.unwrap_or(true));
        } else if within(&target, &format!(".{}", dom::COPY_SEED_CLASS)) {
            frontend.copy_seed();
        } else if within(&target, &format!(".{}", dom::COPY_TAGS_CLASS)) {
            frontend.copy_tags();
        } else if target.class_list().contains(dom::STRIP_IMAGE_CLASS) {
            if let Some(position) = strip_position(&target) {
                frontend.gallery_strip_click(position);
            }
        } else if let Some(item) = closest(&target, &format!(".{}", dom::GRID_ITEM_CLASS)) {
            if let Some(index) = index_attr(&item) {
                frontend.open_fullscreen(index);
            }
        } else if target.id() == dom::FULLSCREEN_ID {
            frontend.fullscreen_background_click();
        } else if within(&target, &format!("#{}", dom::ERROR_ID)) {
            frontend.error_click(within(&target, "a"));
        } else if within(&target, &format!("#{} .{}", dom::CUSTOM_ID, dom::CLOSE_CLASS)) {
            frontend.close_custom_overlay();
        } else if within(&target, &format!(".{}", dom::THUMB_TOGGLE_CLASS)) {
            frontend.toggle_thumb_mode();
        } else if within(&target, &format!(".{}", dom::MINIMIZE_CLASS)) {
            frontend.toggle_button_panel();
        }
    });
}

/// Position of a filmstrip thumbnail, counted from the newest.
fn strip_position(target: &Element) -> Option<usize> {
    let strip = target.parent_element()?;
    let children = strip.children();
    (0..children.length())
        .find(|&i| children.item(i).is_some_and(|child| child.is_same_node(Some(target.as_ref()))))
        .map(|i| i as usize)
}

fn on_keydown(event: Event) {
    let Some(keyboard) = event.dyn_ref::<KeyboardEvent>() else {
        return;
    };
    let key = Key::from_dom(&keyboard.key());
    let modifiers = Modifiers {
        shift: keyboard.shift_key(),
        ctrl: keyboard.ctrl_key(),
        alt: keyboard.alt_key(),
        meta: keyboard.meta_key(),
    };
    let target = target_element(&event);

    let consumed = with_frontend(|frontend| {
        if frontend.is_fullscreen() {
            return frontend.fullscreen_key(key);
        }
        let Some(input) = target.as_ref().and_then(|t| editor_for(frontend, t)) else {
            return false;
        };
        let selection = dom::selection_bytes(&input).unwrap_or((0, 0));
        frontend.editor_key(&input, key, modifiers, selection)
    });
    if consumed == Some(true) {
        event.prevent_default();
        event.stop_propagation();
    }
}

fn on_input(event: Event) {
    let Some(target) = target_element(&event) else {
        return;
    };
    with_frontend(|frontend| {
        if target.class_list().contains(dom::DROPDOWN_INPUT_CLASS) {
            let container = dropdown_container(&target).map(|c| c.id());
            let value = target
                .dyn_ref::<web_sys::HtmlInputElement>()
                .map(|input| input.value());
            if let (Some(container), Some(index), Some(value)) =
                (container, index_attr(&target), value)
            {
                frontend.dropdown_search(&container, index, &value);
            }
        } else if let Some(input) = editor_for(frontend, &target) {
            frontend.editor_input(&input);
        }
    });
}

fn on_mouse_down(event: Event) {
    let (Some(mouse), Some(target)) = (event.dyn_ref::<MouseEvent>(), target_element(&event)) else {
        return;
    };
    let point = pointer(mouse);
    let button = MouseButton::from_dom(mouse.button());
    if let Some(id) = ball_id(&target) {
        event.prevent_default();
        with_frontend(|frontend| frontend.privacy_pointer_down(id, button, point));
        return;
    }
    if button != MouseButton::Left {
        return;
    }

    let drag = if within(&target, &format!(".{}", dom::RESIZE_HANDLE_CLASS)) {
        Some(DragTarget::CustomResize)
    } else if within(&target, &format!(".{}", dom::CLOSE_CLASS)) {
        None
    } else if within(&target, &format!("#{}", dom::CUSTOM_ID)) {
        Some(DragTarget::Custom)
    } else if within(&target, &format!("#{}", dom::LOADING_ID)) {
        Some(DragTarget::Loading)
    } else if within(&target, &format!("#{}", dom::PANEL_ID)) {
        Some(DragTarget::Panel)
    } else {
        None
    };

    match drag {
        Some(drag) => {
            PANEL_PRESSED.with(|flag| flag.set(drag == DragTarget::Panel));
            if drag != DragTarget::Panel {
                event.prevent_default();
            }
            with_frontend(|frontend| frontend.overlay_pointer_down(drag, point));
        }
        None if target.id() == dom::FULLSCREEN_IMAGE_ID => {
            event.prevent_default();
            with_frontend(|frontend| frontend.fullscreen_pointer_down(point));
        }
        None => {
            if let Some((strip_target, strip)) = scroll_strip(&target) {
                event.prevent_default();
                let scroll_left = strip.scroll_left() as f32;
                with_frontend(|frontend| {
                    frontend.scroll_drag_begin(strip_target, point.x, scroll_left)
                });
            }
        }
    }
}

fn on_mouse_move(event: Event) {
    let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
        return;
    };
    let point = pointer(mouse);
    with_frontend(|frontend| {
        frontend.overlay_pointer_move(point);
        frontend.fullscreen_pointer_move(point);
        frontend.privacy_pointer_move(point);
        frontend.scroll_drag_move(point.x);
    });
}

fn on_mouse_up(_event: Event) {
    let click = with_frontend(|frontend| {
        frontend.fullscreen_pointer_up();
        frontend.privacy_pointer_up();
        frontend.scroll_drag_end();
        frontend.overlay_pointer_up()
    });
    if PANEL_PRESSED.with(|flag| flag.replace(false)) && click == Some(false) {
        SUPPRESS_PANEL_CLICK.with(|flag| flag.set(true));
    }
}

fn on_wheel(event: Event) {
    let (Some(wheel), Some(target)) = (event.dyn_ref::<WheelEvent>(), target_element(&event)) else {
        return;
    };
    if !within(&target, &format!("#{}", dom::FULLSCREEN_ID)) {
        return;
    }
    event.prevent_default();
    let delta_y = wheel.delta_y() as f32;
    with_frontend(|frontend| frontend.fullscreen_wheel(delta_y));
}

fn on_mouse_over(event: Event) {
    let Some(target) = target_element(&event) else {
        return;
    };
    let Some(item) = closest(&target, &format!(".{}", dom::DROPDOWN_ITEM_CLASS)) else {
        return;
    };
    if let (Some(container), Some(key)) = (dropdown_container(&item), item.get_attribute("data-key")) {
        let anchor = hover_anchor(&container, &item);
        with_frontend(|frontend| frontend.dropdown_hover(&container.id(), &key, anchor));
    }
}

/// Screen position of a hovered option, relative to its list and the
/// active field's input.
fn hover_anchor(container: &Element, item: &Element) -> Option<HoverAnchor> {
    let list = closest(item, &format!(".{}", dom::DROPDOWN_OPTIONS_CLASS))?;
    let input = container
        .query_selector(&format!(".{}.active input", dom::DROPDOWN_FIELD_CLASS))
        .ok()
        .flatten()?;
    let list = list.get_bounding_client_rect();
    Some(HoverAnchor {
        input_width: input.get_bounding_client_rect().width() as f32,
        list: Rect::new(
            list.left() as f32,
            list.top() as f32,
            list.width() as f32,
            list.height() as f32,
        ),
        item_top: item.get_bounding_client_rect().top() as f32,
    })
}

fn on_mouse_out(event: Event) {
    let (Some(mouse), Some(target)) = (event.dyn_ref::<MouseEvent>(), target_element(&event)) else {
        return;
    };
    if let Some((_, strip)) = scroll_strip(&target) {
        if left_element(mouse, &strip) {
            with_frontend(|frontend| frontend.scroll_drag_end());
        }
        return;
    }
    let Some(list) = closest(&target, &format!(".{}", dom::DROPDOWN_OPTIONS_CLASS)) else {
        return;
    };
    if !left_element(mouse, &list) {
        return;
    }
    if let Some(container) = dropdown_container(&list) {
        with_frontend(|frontend| frontend.dropdown_hover_leave(&container.id()));
    }
}

fn on_double_click(event: Event) {
    let Some(id) = target_element(&event).and_then(|target| ball_id(&target)) else {
        return;
    };
    with_frontend(|frontend| frontend.remove_privacy_ball(id));
}

/// Right drag resizes a privacy ball; keep the menu away.
fn on_context_menu(event: Event) {
    if target_element(&event).is_some_and(|target| ball_id(&target).is_some()) {
        event.prevent_default();
    }
}

fn on_image_error(event: Event) {
    let Some(target) = target_element(&event) else {
        return;
    };
    if target.tag_name() != "IMG" {
        return;
    }
    if within(&target, &format!("#{}", dom::LOADING_ID)) {
        log::warn!("[loading] preview image failed to load");
        with_frontend(|frontend| frontend.preview_failed());
    } else if within(&target, &format!("#{}", dom::CUSTOM_ID)) {
        log::warn!("[overlay] custom image failed to load");
        with_frontend(|frontend| frontend.custom_image_failed());
    }
}
