use std::fmt;

use serde::{Deserialize, Serialize};

/// Variation a client is bucketed into for one experiment.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Variation {
    /// Baseline. Also the answer for anything unknown.
    #[default]
    Control,
    Treatment(String),
}

impl Variation {
    /// An absent name is `Control`. Any present name, even `""`, is a treatment
    /// and is kept exactly as received.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            None => Variation::Control,
            Some(name) => Variation::Treatment(name.to_string()),
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Variation::Control)
    }

    pub fn treatment_name(&self) -> Option<&str> {
        match self {
            Variation::Control => None,
            Variation::Treatment(name) => Some(name),
        }
    }
}

impl From<Option<String>> for Variation {
    fn from(name: Option<String>) -> Self {
        match name {
            None => Variation::Control,
            Some(name) => Variation::Treatment(name),
        }
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Control => write!(f, "control"),
            Variation::Treatment(name) => write!(f, "treatment({name})"),
        }
    }
}
