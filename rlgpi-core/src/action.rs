//! Actions of a finite MDP

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A discrete choice an agent can make.
///
/// Identity is the integer identifier alone; the name is for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    id: usize,
    name: String,
}

impl Action {
    /// Create a new action
    pub fn new(id: usize, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Identifier
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_name() {
        let a = Action::new(3, "left");
        let b = Action::new(3, "other");
        assert_eq!(a, b);
        assert_ne!(a, Action::new(4, "left"));

        let set: HashSet<Action> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display_shows_name_and_id() {
        assert_eq!(Action::new(1, "up").to_string(), "up (1)");
    }
}
