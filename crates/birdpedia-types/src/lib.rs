//! Shared domain types for Birdpedia.
//!
//! The only record the encyclopedia knows about is a [`Bird`]. It is built
//! in memory by callers, handed to the store for persistence, and rebuilt
//! from query results when birds are listed. No identifier is carried: the
//! store never reads a primary key back.

use serde::{Deserialize, Serialize};

/// A single encyclopedia entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bird {
    /// Species name, e.g. "Eurasian wren".
    pub species: String,
    /// Free-form description. May be empty.
    pub description: String,
}

impl Bird {
    /// Builds a bird from anything convertible into owned strings.
    pub fn new(species: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            description: description.into(),
        }
    }
}
