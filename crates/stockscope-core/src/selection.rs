use serde::Serialize;

use crate::SecurityId;

/// Monotonic tag captured when a fetch is issued.
///
/// A result may be committed only while the generation it captured is
/// still current.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub const fn value(self) -> u64 {
        self.0
    }

    const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Currently selected security, if any, plus its generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockSelection {
    security: Option<SecurityId>,
    generation: Generation,
}

impl StockSelection {
    pub fn security(&self) -> Option<&SecurityId> {
        self.security.as_ref()
    }

    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Stores `security` and advances the generation. Returns whether the
    /// selected security changed.
    pub fn select(&mut self, security: Option<SecurityId>) -> bool {
        let changed = self.security != security;
        self.security = security;
        self.bump();
        changed
    }

    /// Invalidates every fetch issued under the current generation.
    pub fn bump(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_reports_change_and_invalidates_previous_generation() {
        let mut selection = StockSelection::default();
        let before = selection.generation();

        let changed = selection.select(Some(SecurityId::parse("sh.600000").expect("valid id")));

        assert!(changed);
        assert!(!selection.is_current(before));
        assert_eq!(selection.security().map(SecurityId::as_str), Some("sh.600000"));
        assert!(!selection.select(Some(SecurityId::parse("sh.600000").expect("valid id"))));
    }
}
