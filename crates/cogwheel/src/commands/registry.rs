use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{Error, commands::Command};

struct CommandMap<E, S> {
    by_name: BTreeMap<String, Command<E, S>>,
    /// Every name and alias, pointing at the canonical name.
    keys: HashMap<String, String>,
}

impl<E, S> CommandMap<E, S> {
    /// Validates a batch against the current keys, ignoring the commands in
    /// `replacing` which are about to be removed.
    fn validate(&self, commands: &[Command<E, S>], replacing: &[String]) -> Result<(), Error> {
        let replaced = replacing
            .iter()
            .filter_map(|name| self.by_name.get(name))
            .flat_map(|command| command.keys())
            .collect::<HashSet<_>>();

        let mut staged = HashSet::new();

        for command in commands {
            for key in command.keys() {
                let taken = self.keys.contains_key(key) && !replaced.contains(key);

                if taken || !staged.insert(key.clone()) {
                    return Err(Error::DuplicateName(key.clone()));
                }
            }
        }

        Ok(())
    }

    fn insert(&mut self, command: Command<E, S>) {
        for key in command.keys() {
            self.keys.insert(key.clone(), command.name.clone());
        }

        self.by_name.insert(command.name.clone(), command);
    }

    fn remove(&mut self, name: &str) -> Option<Command<E, S>> {
        let command = self.by_name.remove(name)?;

        for key in command.keys() {
            self.keys.remove(key);
        }

        Some(command)
    }
}

/// The command registry.
///
/// Every mutation takes the write lock once and finishes before returning, so
/// no reader ever sees a half-registered batch. The lock is never held across
/// an `.await`.
pub struct Commands<E, S> {
    mapping: Arc<RwLock<CommandMap<E, S>>>,
}

impl<E, S> Clone for Commands<E, S> {
    fn clone(&self) -> Self {
        Self {
            mapping: self.mapping.clone(),
        }
    }
}

impl<E, S> fmt::Debug for Commands<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("names", &self.read().by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<E, S> Default for Commands<E, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S> Commands<E, S> {
    pub fn new() -> Self {
        Self {
            mapping: Arc::new(RwLock::new(CommandMap {
                by_name: BTreeMap::new(),
                keys: HashMap::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, CommandMap<E, S>> {
        self.mapping.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CommandMap<E, S>> {
        self.mapping.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register(&self, command: Command<E, S>) -> Result<(), Error> {
        self.register_all(vec![command])
    }

    /// Registers every command or none of them.
    pub fn register_all(&self, commands: Vec<Command<E, S>>) -> Result<(), Error> {
        let mut mapping = self.write();

        mapping.validate(&commands, &[])?;

        for command in commands {
            log::debug!("registered command `{}`", command.name);
            mapping.insert(command);
        }

        Ok(())
    }

    /// Removes a command by name or alias, together with all its aliases.
    pub fn unregister(&self, name: &str) -> Result<Command<E, S>, Error> {
        let mut mapping = self.write();

        let canonical = mapping
            .keys
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        mapping
            .remove(&canonical)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    /// Removes several commands at once; names that are not registered are
    /// skipped.
    pub fn unregister_all(&self, names: &[String]) -> Vec<Command<E, S>> {
        let mut mapping = self.write();

        names
            .iter()
            .filter_map(|name| mapping.remove(name))
            .collect()
    }

    /// Swaps the commands named in `old` for `new` in one step. On a name
    /// collision nothing changes.
    pub fn replace(&self, old: &[String], new: Vec<Command<E, S>>) -> Result<(), Error> {
        let mut mapping = self.write();

        mapping.validate(&new, old)?;

        for name in old {
            mapping.remove(name);
        }

        for command in new {
            mapping.insert(command);
        }

        Ok(())
    }

    /// Exact, case-sensitive lookup of a name or alias.
    pub fn resolve(&self, token: &str) -> Result<Command<E, S>, Error>
    where
        Command<E, S>: Clone,
    {
        let mapping = self.read();

        mapping
            .keys
            .get(token)
            .and_then(|name| mapping.by_name.get(name))
            .cloned()
            .ok_or_else(|| Error::NotFound(token.to_string()))
    }

    pub fn contains(&self, token: &str) -> bool {
        self.read().keys.contains_key(token)
    }

    /// Commands matching `filter`, each once, ordered by name.
    ///
    /// The iterator works on a snapshot taken at call time; call again to see
    /// later changes.
    pub fn list<F>(&self, filter: F) -> impl Iterator<Item = Command<E, S>> + use<E, S, F>
    where
        F: Fn(&Command<E, S>) -> bool,
        Command<E, S>: Clone,
    {
        let snapshot = self.read().by_name.values().cloned().collect::<Vec<_>>();

        snapshot.into_iter().filter(move |command| filter(command))
    }

    pub fn get_commands(&self) -> Vec<Command<E, S>>
    where
        Command<E, S>: Clone,
    {
        self.list(|_| true).collect()
    }

    /// Commands contributed by one extension.
    pub fn owned_by(&self, extension: &str) -> Vec<Command<E, S>>
    where
        Command<E, S>: Clone,
    {
        self.list(|command| command.extension.as_deref() == Some(extension))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use crate::{Error, commands::Command, testing::TestState};

    use super::Commands;

    type Cmd = Command<Error, TestState>;

    async fn noop(_ctx: crate::commands::Context<Error, TestState>) -> Result<(), Error> {
        Ok(())
    }

    fn command(name: &str, aliases: &[&str]) -> Cmd {
        aliases
            .iter()
            .fold(Command::new(name, noop), |command, alias| command.alias(*alias))
    }

    #[test]
    fn resolves_names_and_aliases() {
        let commands = Commands::new();

        commands.register(command("help", &["h", "?"])).unwrap();

        for token in ["help", "h", "?"] {
            assert_eq!(commands.resolve(token).unwrap().name, "help");
        }

        assert!(matches!(commands.resolve("Help"), Err(Error::NotFound(_))));
        assert!(matches!(commands.resolve("hel"), Err(Error::NotFound(_))));
    }

    #[test]
    fn duplicate_alias_leaves_registry_unchanged() {
        let commands = Commands::new();

        commands.register(command("addrole", &["ar"])).unwrap();

        let result = commands.register(command("another", &["ar"]));

        assert!(matches!(result, Err(Error::DuplicateName(key)) if key == "ar"));
        assert!(!commands.contains("another"));
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn batch_with_internal_collision_registers_nothing() {
        let commands = Commands::new();

        let result = commands.register_all(vec![
            command("ping", &[]),
            command("pong", &["ping"]),
        ]);

        assert!(matches!(result, Err(Error::DuplicateName(_))));
        assert!(commands.is_empty());
    }

    #[test]
    fn unregister_by_alias_removes_every_key() {
        let commands = Commands::new();

        commands.register(command("removerole", &["rr"])).unwrap();

        let removed = commands.unregister("rr").unwrap();

        assert_eq!(removed.name, "removerole");
        assert!(!commands.contains("removerole"));
        assert!(!commands.contains("rr"));
        assert!(matches!(
            commands.unregister("removerole"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn replace_allows_reusing_the_replaced_names() {
        let commands = Commands::new();

        commands.register(command("ping", &["p"])).unwrap();
        commands
            .replace(&["ping".to_string()], vec![command("ping", &["p", "pp"])])
            .unwrap();

        assert_eq!(commands.resolve("pp").unwrap().name, "ping");
    }

    #[test]
    fn list_is_sorted_and_restartable() {
        let commands = Commands::new();

        commands
            .register_all(vec![
                command("zeta", &["z"]),
                command("alpha", &[]),
                command("hidden", &[]).hidden(),
            ])
            .unwrap();

        let visible = || {
            commands
                .list(|command| !command.hidden)
                .map(|command| command.name)
                .collect::<Vec<_>>()
        };

        assert_eq!(visible(), vec!["alpha", "zeta"]);
        assert_eq!(visible(), vec!["alpha", "zeta"]);
    }
}
