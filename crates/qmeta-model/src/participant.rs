//! Participant roles declared per questionnaire.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParticipantRole {
    Child,
    Mother,
    Father,
    Parent,
    Clinician,
    Other(String),
}

impl ParticipantRole {
    pub fn as_str(&self) -> &str {
        match self {
            ParticipantRole::Child => "Child",
            ParticipantRole::Mother => "Mother",
            ParticipantRole::Father => "Father",
            ParticipantRole::Parent => "Parent",
            ParticipantRole::Clinician => "Clinician",
            ParticipantRole::Other(raw) => raw,
        }
    }
}

impl From<&str> for ParticipantRole {
    fn from(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "child" => ParticipantRole::Child,
            "mother" => ParticipantRole::Mother,
            "father" => ParticipantRole::Father,
            "parent" | "parents" => ParticipantRole::Parent,
            "clinician" => ParticipantRole::Clinician,
            _ => ParticipantRole::Other(raw.trim().to_string()),
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Questionnaire name to declared participant role.
#[derive(Debug, Clone, Default)]
pub struct ParticipantRoles {
    roles: BTreeMap<String, ParticipantRole>,
}

impl ParticipantRoles {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, ParticipantRole)>,
    {
        Self {
            roles: pairs.into_iter().collect(),
        }
    }

    pub fn role_of(&self, questionnaire: &str) -> Option<&ParticipantRole> {
        self.roles.get(questionnaire)
    }

    pub fn has_role(&self, questionnaire: &str, role: &ParticipantRole) -> bool {
        self.role_of(questionnaire) == Some(role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
