use std::fmt;

use crate::shared::constants::UNKNOWN_PERSON;

/// Who a matched face belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Known { full_name: String },
    Unknown,
}

impl Identity {
    pub fn known(full_name: impl Into<String>) -> Self {
        Self::Known {
            full_name: full_name.into(),
        }
    }

    /// Display name; `"Unknown Person"` for unresolved faces.
    pub fn name(&self) -> &str {
        match self {
            Self::Known { full_name } => full_name,
            Self::Unknown => UNKNOWN_PERSON,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
