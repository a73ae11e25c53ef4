//! cg_frontend - browser front end of the cg image generator
//!
//! Receives finished and preview images over a push channel, keeps them in a
//! session gallery and drives the page overlays, dropdowns and prompt
//! autocompletion. The state lives in headless modules; `wasm` binds them to
//! the DOM and `native` drives them from a terminal monitor.

pub mod app;
pub mod channel;
pub mod config;
pub mod constants;
pub mod context;
pub mod dropdowns;
pub mod gallery;
pub mod info_box;
pub mod overlay;
pub mod scheduler;
pub mod storage;
pub mod suggest;
pub mod surface;
pub mod thumbs;

pub use app::{Frontend, Services};

#[cfg(not(target_arch = "wasm32"))]
pub mod native;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
