use std::{sync::Arc, time::Instant};

use crate::ConfigStore;

#[derive(Clone, Debug)]
pub struct State {
    pub config: Arc<ConfigStore>,
    pub started: Instant,
}

impl State {
    pub fn new(config: ConfigStore) -> Self {
        Self {
            config: Arc::new(config),
            started: Instant::now(),
        }
    }

    pub fn is_owner(&self, actor_id: u64) -> bool {
        self.config.get().owners.contains(&actor_id)
    }
}
