//! Strongly typed identifier wrappers.

use std::fmt;

/// Position of a destination inside the session's resolved destination set.
///
/// Destinations are immutable once resolved, so the index is stable for the
/// whole session.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DestinationId(pub u32);

impl DestinationId {
    /// Cast to `usize` for direct use as a `Vec` index.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DestinationId({})", self.0)
    }
}

impl TryFrom<usize> for DestinationId {
    type Error = std::num::TryFromIntError;

    fn try_from(v: usize) -> Result<Self, Self::Error> {
        u32::try_from(v).map(DestinationId)
    }
}
