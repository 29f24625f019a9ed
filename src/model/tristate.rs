//! A tri-valued boolean: `Unknown` is distinguished from `False` through
//! every serialization round-trip, unlike a plain `Option<bool>` which
//! display code tends to collapse `None` into "false".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tristate {
    #[default]
    Unknown,
    True,
    False,
}

impl Tristate {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Tristate::True
        } else {
            Tristate::False
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Tristate::Unknown => None,
            Tristate::True => Some(true),
            Tristate::False => Some(false),
        }
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            None => Tristate::Unknown,
            Some(v) => Tristate::from_bool(v),
        }
    }
}
