use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Restaurant,
    NgoAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Restaurant => f.write_str("restaurant"),
            Role::NgoAdmin => f.write_str("ngo_admin"),
        }
    }
}

/// What a principal is allowed to do with demands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    CreateDemand,
    BrowseOpenDemands,
    ViewOwnDemands,
    RespondToDemand,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::CreateDemand => "create demands",
            Capability::BrowseOpenDemands => "browse open demands",
            Capability::ViewOwnDemands => "view NGO demands",
            Capability::RespondToDemand => "respond to demands",
        };
        f.write_str(name)
    }
}

impl Role {
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Role::Restaurant => &[Capability::BrowseOpenDemands, Capability::RespondToDemand],
            Role::NgoAdmin => &[Capability::CreateDemand, Capability::ViewOwnDemands],
        }
    }
}

/// Authenticated actor of a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub role: Role,
    pub organization_id: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role, organization_id: impl Into<String>) -> Self {
        Principal {
            id: id.into(),
            role,
            organization_id: organization_id.into(),
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.capabilities().contains(&capability)
    }
}
