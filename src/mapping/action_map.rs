//! Binding table from raw inputs to game actions
//!
//! One map is installed per driver mode. Lookups never fail: a control that is
//! not bound in the active map resolves to `None` and is ignored, which is how
//! each mode restricts the set of actions it delivers.

use crate::mapping::action::GameAction;
use crate::mapping::input::Input;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default)]
pub struct ActionMap {
    name: String,
    entries: HashMap<Input, GameAction>,
}

impl ActionMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    /// Binds `input` to `action`, returning the action it replaced
    pub fn insert(&mut self, input: Input, action: GameAction) -> Option<GameAction> {
        let previous = self.entries.insert(input, action);
        if let Some(previous) = previous {
            if previous != action {
                warn!(
                    "{} map: {} rebound from {:?} to {:?}",
                    self.name, input, previous, action
                );
            }
        }
        previous
    }

    pub fn resolve(&self, input: &Input) -> Option<GameAction> {
        let action = self.entries.get(input).copied();
        if action.is_none() {
            debug!("{} map: {} is unbound", self.name, input);
        }
        action
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
