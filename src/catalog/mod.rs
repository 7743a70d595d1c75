//! The fixed catalog of interval types.
//!
//! The catalog is the only place that resolves identity strings coming from
//! outside the process (scheduled notifications, IPC requests) back into
//! [`IntervalType`] values.

mod error;

pub use self::error::CatalogError;

use crate::types::IntervalType;

/// All interval types in display order.
const ITEMS: [IntervalType; 3] = [
    IntervalType::TaskTimer,
    IntervalType::ShortBreak,
    IntervalType::LongBreak,
];

/// Read-only access to the three interval types.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalCatalog;

impl IntervalCatalog {
    /// Returns every interval type in display order: work, short break, long break.
    pub fn all() -> &'static [IntervalType] {
        &ITEMS
    }

    /// Returns the interval selected when nothing else is known.
    pub fn first() -> IntervalType {
        ITEMS[0]
    }

    /// Resolves an identity string.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no interval has that identity.
    pub fn lookup(id: &str) -> Result<IntervalType, CatalogError> {
        ITEMS
            .iter()
            .copied()
            .find(|item| item.id() == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}
