//! Shared application context handed to every component.

use std::collections::BTreeMap;
use std::rc::Rc;

use cg_ui::{DropdownController, Size};

use crate::config::AppConfig;
use crate::scheduler::Scheduler;
use crate::storage::KeyValueStore;

/// Configuration, services and the registry of live dropdowns.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Rc<dyn KeyValueStore>,
    pub scheduler: Rc<dyn Scheduler>,
    pub viewport: Size,
    dropdowns: BTreeMap<String, DropdownController>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        store: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn Scheduler>,
        viewport: Size,
    ) -> Self {
        Self {
            config,
            store,
            scheduler,
            viewport,
            dropdowns: BTreeMap::new(),
        }
    }

    /// Register a dropdown under its container id, replacing any previous one.
    pub fn register_dropdown(&mut self, container: impl Into<String>, dropdown: DropdownController) {
        let container = container.into();
        if self.dropdowns.insert(container.clone(), dropdown).is_some() {
            log::debug!("[context] replaced dropdown '{}'", container);
        }
    }

    pub fn dropdown(&self, container: &str) -> Option<&DropdownController> {
        self.dropdowns.get(container)
    }

    pub fn dropdown_mut(&mut self, container: &str) -> Option<&mut DropdownController> {
        self.dropdowns.get_mut(container)
    }

    pub fn dropdowns_mut(&mut self) -> impl Iterator<Item = (&str, &mut DropdownController)> {
        self.dropdowns.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn dropdown_ids(&self) -> Vec<String> {
        self.dropdowns.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::storage::MemoryStore;

    #[test]
    fn test_dropdown_registry() {
        let mut ctx = AppContext::new(
            AppConfig::default(),
            Rc::new(MemoryStore::new()),
            Rc::new(ManualScheduler::new()),
            Size::new(800.0, 600.0),
        );
        ctx.register_dropdown("cd", DropdownController::new(vec!["a".into()]));
        assert_eq!(ctx.dropdown("cd").map(|d| d.field_count()), Some(1));
        ctx.register_dropdown("cd", DropdownController::new(vec!["a".into(), "b".into()]));
        assert_eq!(ctx.dropdown_mut("cd").map(|d| d.field_count()), Some(2));
        assert!(ctx.dropdown("other").is_none());
        assert_eq!(ctx.dropdown_ids(), vec!["cd".to_string()]);
    }
}
