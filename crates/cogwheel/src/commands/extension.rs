use std::{
    collections::BTreeMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    CommandError, Error,
    commands::{Command, Commands, boundary::panic_message},
};

/// Root every extension id lives under.
pub const EXTENSIONS_ROOT: &str = "cogs";

/// Canonical form of an extension id: `help` and `cogs.help` both become
/// `cogs.help`. Returns `None` for ids that are not dotted identifiers.
pub fn qualify(id: &str) -> Option<String> {
    let id = id.trim();

    let valid = !id.is_empty()
        && id.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if !valid || id == EXTENSIONS_ROOT {
        return None;
    }

    if id.starts_with(&format!("{EXTENSIONS_ROOT}.")) {
        Some(id.to_string())
    } else {
        Some(format!("{EXTENSIONS_ROOT}.{id}"))
    }
}

/// A bundle of commands that can be loaded and unloaded at runtime.
///
/// Hooks are synchronous so that activating an extension is a single step.
#[allow(unused)]
pub trait Extension<E, S>: Send + Sync + 'static {
    /// Display name shown in help.
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn commands(&self) -> Vec<Command<E, S>>;

    fn on_load(&self, state: &S) -> Result<(), E> {
        Ok(())
    }

    fn on_unload(&self, state: &S) {}
}

type Factory<E, S> = Arc<dyn Fn() -> Result<Box<dyn Extension<E, S>>, E> + Send + Sync>;

/// Extensions the bot knows how to construct, by canonical id.
pub struct ExtensionCatalog<E, S> {
    factories: BTreeMap<String, Factory<E, S>>,
}

impl<E, S> Default for ExtensionCatalog<E, S> {
    fn default() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }
}

impl<E, S> fmt::Debug for ExtensionCatalog<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

impl<E: 'static, S: 'static> ExtensionCatalog<E, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(mut self, id: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Extension<E, S>>, E> + Send + Sync + 'static,
    {
        let id = qualify(id).unwrap_or_else(|| id.to_string());

        self.factories.insert(id, Arc::new(factory));

        self
    }

    pub fn contains(&self, id: &str) -> bool {
        qualify(id).is_some_and(|id| self.factories.contains_key(&id))
    }

    pub fn ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

struct LoadedExtension<E, S> {
    extension: Arc<dyn Extension<E, S>>,
    /// Canonical names of the commands this extension registered.
    commands: Vec<String>,
}

struct Table<E, S> {
    catalog: ExtensionCatalog<E, S>,
    loaded: BTreeMap<String, LoadedExtension<E, S>>,
}

type Instance<E, S> = (Arc<dyn Extension<E, S>>, Vec<Command<E, S>>);

/// The table of active extensions.
///
/// Each entry owns the names of the commands it contributed, so loading and
/// unloading move whole groups in and out of the registry at once. The table
/// lock is always taken before the registry lock.
pub struct Extensions<E, S> {
    inner: Arc<Mutex<Table<E, S>>>,
    commands: Commands<E, S>,
    state: S,
}

impl<E, S: Clone> Clone for Extensions<E, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            commands: self.commands.clone(),
            state: self.state.clone(),
        }
    }
}

impl<E, S> fmt::Debug for Extensions<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.lock();

        f.debug_struct("Extensions")
            .field("loaded", &table.loaded.keys().collect::<Vec<_>>())
            .field("catalog", &table.catalog)
            .finish_non_exhaustive()
    }
}

impl<E, S> Extensions<E, S> {
    fn lock(&self) -> MutexGuard<'_, Table<E, S>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: CommandError, S: Clone + Send + Sync + 'static> Extensions<E, S> {
    pub fn new(commands: Commands<E, S>, state: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Table {
                catalog: ExtensionCatalog::new(),
                loaded: BTreeMap::new(),
            })),
            commands,
            state,
        }
    }

    pub fn set_catalog(&self, catalog: ExtensionCatalog<E, S>) {
        self.lock().catalog = catalog;
    }

    /// Activates an extension and registers all of its commands. Returns the
    /// canonical id.
    pub fn load(&self, id: &str) -> Result<String, Error> {
        let id = qualify(id).ok_or_else(|| Error::ExtensionLoad {
            id: id.to_string(),
            reason: "invalid extension id".to_string(),
        })?;

        let mut table = self.lock();

        if table.loaded.contains_key(&id) {
            return Err(Error::AlreadyLoaded(id));
        }

        let Some(factory) = table.catalog.factories.get(&id).cloned() else {
            return Err(Error::ExtensionLoad {
                id,
                reason: "no such extension".to_string(),
            });
        };

        let (extension, commands) =
            self.instantiate(&id, &factory)
                .map_err(|reason| Error::ExtensionLoad {
                    id: id.clone(),
                    reason,
                })?;

        let names = commands.iter().map(|c| c.name.clone()).collect::<Vec<_>>();

        if let Err(e) = self.commands.register_all(commands) {
            self.teardown(&id, extension.as_ref());

            return Err(Error::ExtensionLoad {
                id,
                reason: e.to_string(),
            });
        }

        table.loaded.insert(
            id.clone(),
            LoadedExtension {
                extension,
                commands: names,
            },
        );

        log::info!("Loaded extension `{id}`");

        Ok(id)
    }

    /// Runs the teardown hook and removes every command the extension added.
    pub fn unload(&self, id: &str) -> Result<String, Error> {
        let id = qualify(id).ok_or_else(|| Error::NotLoaded(id.to_string()))?;

        let mut table = self.lock();

        let loaded = table
            .loaded
            .remove(&id)
            .ok_or_else(|| Error::NotLoaded(id.clone()))?;

        self.teardown(&id, loaded.extension.as_ref());
        self.commands.unregister_all(&loaded.commands);

        log::info!("Unloaded extension `{id}`");

        Ok(id)
    }

    /// Swaps an active extension for a freshly constructed instance.
    ///
    /// If the new instance cannot be brought up the old one stays active
    /// with its commands, and its teardown hook is not run.
    pub fn reload(&self, id: &str) -> Result<String, Error> {
        let id = qualify(id).ok_or_else(|| Error::NotLoaded(id.to_string()))?;

        let mut table = self.lock();

        let Some(previous) = table.loaded.get(&id) else {
            return Err(Error::NotLoaded(id));
        };

        let previous_commands = previous.commands.clone();
        let previous_extension = previous.extension.clone();

        let reload_error = |reason: String| Error::ExtensionReload {
            id: id.clone(),
            reason,
        };

        let factory = table
            .catalog
            .factories
            .get(&id)
            .cloned()
            .ok_or_else(|| reload_error("no such extension".to_string()))?;

        let (extension, commands) = self.instantiate(&id, &factory).map_err(reload_error)?;
        let names = commands.iter().map(|c| c.name.clone()).collect::<Vec<_>>();

        if let Err(e) = self.commands.replace(&previous_commands, commands) {
            self.teardown(&id, extension.as_ref());

            return Err(reload_error(e.to_string()));
        }

        self.teardown(&id, previous_extension.as_ref());

        table.loaded.insert(
            id.clone(),
            LoadedExtension {
                extension,
                commands: names,
            },
        );

        log::info!("Reloaded extension `{id}`");

        Ok(id)
    }

    /// Constructs an extension, tags its commands and runs its load hook.
    /// Errors and panics come back as a description.
    fn instantiate(&self, id: &str, factory: &Factory<E, S>) -> Result<Instance<E, S>, String> {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Instance<E, S>, E> {
            let extension: Arc<dyn Extension<E, S>> = Arc::from(factory()?);

            let commands = extension
                .commands()
                .into_iter()
                .map(|mut command| {
                    command.extension = Some(id.to_string());
                    command
                })
                .collect::<Vec<_>>();

            extension.on_load(&self.state)?;

            Ok((extension, commands))
        }));

        match attempt {
            Ok(Ok(instance)) => Ok(instance),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }

    fn teardown(&self, id: &str, extension: &dyn Extension<E, S>) {
        if let Err(payload) =
            panic::catch_unwind(AssertUnwindSafe(|| extension.on_unload(&self.state)))
        {
            log::error!(
                "Teardown of extension `{id}` panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        qualify(id).is_some_and(|id| self.lock().loaded.contains_key(&id))
    }

    /// Ids of the active extensions, sorted.
    pub fn loaded(&self) -> Vec<String> {
        self.lock().loaded.keys().cloned().collect()
    }

    /// Ids in the catalog, loaded or not.
    pub fn available(&self) -> Vec<String> {
        self.lock().catalog.ids()
    }

    pub fn get(&self, id: &str) -> Option<ExtensionInfo> {
        let id = qualify(id)?;
        let table = self.lock();
        let loaded = table.loaded.get(&id)?;

        Some(info(&id, loaded.extension.as_ref()))
    }

    /// Info for every active extension, ordered by id.
    pub fn describe(&self) -> Vec<ExtensionInfo> {
        self.lock()
            .loaded
            .iter()
            .map(|(id, loaded)| info(id, loaded.extension.as_ref()))
            .collect()
    }
}

fn info<E: 'static, S: 'static>(id: &str, extension: &dyn Extension<E, S>) -> ExtensionInfo {
    ExtensionInfo {
        id: id.to_string(),
        name: extension.name().to_string(),
        description: extension.description().map(str::to_string),
    }
}
