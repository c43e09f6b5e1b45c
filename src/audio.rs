//! Sound cues raised by the simulation
//!
//! The core never produces audio itself. When sound is enabled it queues
//! cues and the front end drains them once per frame and plays whatever its
//! backend can (synthesized tunes, a terminal bell, nothing).

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Banana leaves the gorilla's hand
    Throw,
    /// Weak, backwards or self-inflicted shot
    Alert,
    /// Any explosion starts
    Explosion,
    /// One bounce of the victory dance
    Dance,
}

/// Pending cues, in the order they were raised
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundQueue {
    enabled: bool,
    pending: Vec<SoundEffect>,
}

impl SoundQueue {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: Vec::new(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending.clear();
        }
    }

    /// Queue a cue; ignored while disabled
    pub fn play(&mut self, effect: SoundEffect) {
        if self.enabled {
            self.pending.push(effect);
        }
    }

    /// Take every pending cue
    pub fn drain(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
