//! Slot allocation for global and per-player variables.

use std::collections::HashMap;

use tracing::trace;

/// Storage identity of a variable.
///
/// Player variables are qualified by the lowered text of their player
/// expression, so `x@Event Player` and `x@Attacker` are distinct keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum VarKey {
    Global(String),
    Player { name: String, player: String },
}

impl VarKey {
    pub fn global(name: &str) -> Self {
        VarKey::Global(name.to_string())
    }

    pub fn player(name: &str, player: &str) -> Self {
        VarKey::Player {
            name: name.to_string(),
            player: player.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VarKey::Global(name) | VarKey::Player { name, .. } => name,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self, VarKey::Player { .. })
    }
}

/// Dense first-reference slot numbering.
///
/// Globals share one counter; every distinct player expression has its own.
#[derive(Debug, Default)]
pub(crate) struct VarAllocator {
    slots: HashMap<VarKey, u32>,
    next_global: u32,
    next_player: HashMap<String, u32>,
}

impl VarAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot of an already-allocated key.
    pub fn get(&self, key: &VarKey) -> Option<u32> {
        self.slots.get(key).copied()
    }

    pub fn allocate_or_get(&mut self, key: &VarKey) -> u32 {
        if let Some(slot) = self.get(key) {
            return slot;
        }
        let counter = match key {
            VarKey::Global(_) => &mut self.next_global,
            VarKey::Player { player, .. } => self.next_player.entry(player.clone()).or_insert(0),
        };
        let slot = *counter;
        *counter += 1;
        trace!(?key, slot, "allocated variable slot");
        self.slots.insert(key.clone(), slot);
        slot
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
