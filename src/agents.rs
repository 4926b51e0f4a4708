//! # AI Agent Roster and Speaker Selection
//!
//! The moderation layer runs a roster of AI personas that take turns speaking
//! in a room. The roster is plain data supplied to the server; which persona
//! speaks next is decided by a `SelectionPolicy`.
//!
//! The only policy implemented today is uniform-random. It is an explicit
//! placeholder: selection sits behind a trait so a real scheduling or
//! priority policy can replace it without touching any caller.

use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

/// A moderation persona: the voice and instructions for one AI participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Stable identifier used in logs and room events.
    pub id: String,

    /// Display name shown to human participants.
    pub name: String,

    /// Voice preset for speech synthesis.
    pub voice: String,

    /// Persona text template steering the agent's behavior.
    pub system_prompt: String,
}

/// Decides which persona speaks next.
///
/// Injected wherever turn-taking happens so the placeholder below can be
/// swapped for a real policy later.
pub trait SelectionPolicy: Send + Sync {
    /// Pick the next speaker from the roster. Returns `None` for an empty
    /// roster - there is nobody to speak.
    fn next_speaker<'a>(&self, roster: &'a [Persona]) -> Option<&'a Persona>;
}

/// Placeholder policy: uniform-random choice over the roster.
pub struct RandomSelection;

impl SelectionPolicy for RandomSelection {
    fn next_speaker<'a>(&self, roster: &'a [Persona]) -> Option<&'a Persona> {
        roster.choose(&mut rand::rng())
    }
}
