/// Native push-channel monitor entry point
///
/// Usage: `cg-frontend-native [MAX_IMAGES]`
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::rc::Rc;

    use cg_frontend::config::AppConfig;
    use cg_frontend::native::{self, MonitorOptions};
    use cg_frontend::storage::{FileStore, KeyValueStore, MemoryStore};

    let config = AppConfig::load_from_default_path();
    env_logger::Builder::from_default_env()
        .filter_level(config.preferences.log_level.to_level_filter())
        .init();

    let max_images = match std::env::args().nth(1).map(|arg| arg.parse::<usize>()) {
        Some(Ok(max)) => Some(max),
        Some(Err(e)) => {
            eprintln!("Invalid image count: {}", e);
            std::process::exit(2);
        }
        None => None,
    };

    let store: Rc<dyn KeyValueStore> = match FileStore::default_path().map(FileStore::open) {
        Some(Ok(store)) => Rc::new(store),
        Some(Err(e)) => {
            log::warn!("Failed to open state file, using memory: {}", e);
            Rc::new(MemoryStore::new())
        }
        None => Rc::new(MemoryStore::new()),
    };

    match native::run(config, store, MonitorOptions { max_images }) {
        Ok(summary) => log::info!(
            "Received {} images in {} session(s)",
            summary.images,
            summary.sessions
        ),
        Err(e) => {
            eprintln!("Monitor error: {}", e);
            std::process::exit(1);
        }
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
