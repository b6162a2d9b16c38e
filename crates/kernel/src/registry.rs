use anyhow::Context;
use std::sync::Arc;

use crate::module::{InitCtx, Migration, Module};

/// Core modules in initialization order. Custom modules always follow them.
const CORE_MODULE_ORDER: &[&str] = &[
    "db", // Database connection
];

/// Module registry for managing module lifecycle with core/custom separation
#[derive(Default)]
pub struct ModuleRegistry {
    core_modules: Vec<Arc<dyn Module>>,
    custom_modules: Vec<Arc<dyn Module>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a core module. Core modules not listed in the core order are ignored
    /// by lifecycle calls.
    pub fn register_core(&mut self, module: Arc<dyn Module>) {
        self.core_modules.push(module);
    }

    /// Register a custom module; custom modules run in registration order.
    pub fn register_custom(&mut self, module: Arc<dyn Module>) {
        self.custom_modules.push(module);
    }

    /// All registered modules, core first.
    pub fn modules(&self) -> Vec<&Arc<dyn Module>> {
        self.core_modules
            .iter()
            .chain(self.custom_modules.iter())
            .collect()
    }

    pub fn get_module(&self, name: &str) -> Option<&Arc<dyn Module>> {
        self.modules().into_iter().find(|module| module.name() == name)
    }

    fn ordered_core(&self) -> impl DoubleEndedIterator<Item = &Arc<dyn Module>> {
        CORE_MODULE_ORDER.iter().filter_map(|&name| {
            self.core_modules
                .iter()
                .find(|module| module.name() == name)
        })
    }

    /// Modules in lifecycle order: ordered core modules, then custom modules.
    fn lifecycle_order(&self) -> Vec<&Arc<dyn Module>> {
        self.ordered_core()
            .chain(self.custom_modules.iter())
            .collect()
    }

    pub async fn init_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.lifecycle_order() {
            tracing::info!(module = module.name(), "initializing module");
            module
                .init(ctx)
                .await
                .with_context(|| format!("failed to initialize module '{}'", module.name()))?;
        }
        Ok(())
    }

    pub async fn start_all(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        for module in self.lifecycle_order() {
            tracing::info!(module = module.name(), "starting module");
            module
                .start(ctx)
                .await
                .with_context(|| format!("failed to start module '{}'", module.name()))?;
        }
        Ok(())
    }

    /// Stop every module in reverse lifecycle order. Keeps going past failures
    /// and reports the first one.
    pub async fn stop_all(&self) -> anyhow::Result<()> {
        let mut first_error = None;
        for module in self.lifecycle_order().into_iter().rev() {
            tracing::info!(module = module.name(), "stopping module");
            if let Err(err) = module.stop().await {
                tracing::error!(module = module.name(), error = %err, "module failed to stop");
                first_error.get_or_insert(
                    err.context(format!("failed to stop module '{}'", module.name())),
                );
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Collect migrations from every module as `(module name, migration)`,
    /// sorted by module name then migration id.
    pub fn collect_migrations(&self) -> Vec<(String, Migration)> {
        let mut migrations: Vec<(String, Migration)> = self
            .modules()
            .into_iter()
            .flat_map(|module| {
                module
                    .migrations()
                    .into_iter()
                    .map(move |migration| (module.name().to_string(), migration))
            })
            .collect();

        migrations.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(b.1.id)));
        migrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::sync::Mutex;

    struct RecordingModule {
        name: &'static str,
        journal: Arc<Mutex<Vec<String>>>,
        fail_stop: bool,
    }

    impl RecordingModule {
        fn new(name: &'static str, journal: &Arc<Mutex<Vec<String>>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                journal: journal.clone(),
                fail_stop: false,
            })
        }

        fn record(&self, event: &str) {
            self.journal
                .lock()
                .unwrap()
                .push(format!("{}:{}", event, self.name));
        }
    }

    #[async_trait::async_trait]
    impl Module for RecordingModule {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("init");
            Ok(())
        }

        fn migrations(&self) -> Vec<Migration> {
            vec![
                Migration {
                    id: "002_second",
                    command: serde_json::json!({}),
                },
                Migration {
                    id: "001_first",
                    command: serde_json::json!({}),
                },
            ]
        }

        async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
            self.record("start");
            Ok(())
        }

        async fn stop(&self) -> anyhow::Result<()> {
            self.record("stop");
            if self.fail_stop {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[test]
    fn empty_registry_has_no_modules_or_migrations() {
        let registry = ModuleRegistry::new();
        assert!(registry.modules().is_empty());
        assert!(registry.collect_migrations().is_empty());
    }

    #[test]
    fn migrations_are_sorted_by_module_then_id() {
        let journal = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_custom(RecordingModule::new("books", &journal));
        registry.register_core(RecordingModule::new("db", &journal));

        let ids: Vec<String> = registry
            .collect_migrations()
            .into_iter()
            .map(|(module, migration)| format!("{}/{}", module, migration.id))
            .collect();
        assert_eq!(
            ids,
            vec![
                "books/001_first",
                "books/002_second",
                "db/001_first",
                "db/002_second"
            ]
        );
    }

    #[test]
    fn get_module_searches_core_and_custom() {
        let journal = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_core(RecordingModule::new("db", &journal));
        registry.register_custom(RecordingModule::new("books", &journal));

        assert!(registry.get_module("db").is_some());
        assert!(registry.get_module("books").is_some());
        assert!(registry.get_module("users").is_none());
    }

    #[tokio::test]
    async fn lifecycle_runs_core_first_and_stops_in_reverse() {
        let journal: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_custom(RecordingModule::new("books", &journal));
        registry.register_core(RecordingModule::new("db", &journal));
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        registry.init_all(&ctx).await.unwrap();
        registry.start_all(&ctx).await.unwrap();
        registry.stop_all().await.unwrap();

        assert_eq!(
            *journal.lock().unwrap(),
            vec![
                "init:db",
                "init:books",
                "start:db",
                "start:books",
                "stop:books",
                "stop:db"
            ]
        );
    }

    #[tokio::test]
    async fn stop_all_continues_after_failure() {
        let journal: Arc<Mutex<Vec<String>>> = Arc::default();
        let mut registry = ModuleRegistry::new();
        registry.register_core(RecordingModule::new("db", &journal));
        registry.register_custom(Arc::new(RecordingModule {
            name: "books",
            journal: journal.clone(),
            fail_stop: true,
        }));

        let err = registry.stop_all().await.unwrap_err();
        assert!(err.to_string().contains("books"));
        assert_eq!(*journal.lock().unwrap(), vec!["stop:books", "stop:db"]);
    }
}
