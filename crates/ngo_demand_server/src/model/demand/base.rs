use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DemandStatus {
    Open,
    Accepted,
    Ignored,
}

impl DemandStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, DemandStatus::Open)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DemandStatus::Open => "OPEN",
            DemandStatus::Accepted => "ACCEPTED",
            DemandStatus::Ignored => "IGNORED",
        }
    }
}

impl fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Surplus-food demand posted by an NGO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demand {
    pub id: Uuid,
    pub ngo_id: String,
    pub description: String,
    pub quantity: u32,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub status: DemandStatus,
    /// Restaurant that accepted the demand. Only set while `status` is `ACCEPTED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responding_restaurant_id: Option<String>,
}

impl Demand {
    pub fn open(ngo_id: String, fields: ValidDemandFields, created_at: DateTime<Utc>) -> Self {
        Demand {
            id: Uuid::new_v4(),
            ngo_id,
            description: fields.description,
            quantity: fields.quantity,
            location: fields.location,
            created_at,
            status: DemandStatus::Open,
            restaurant_id: None,
            responded_at: None,
            responding_restaurant_id: None,
        }
    }

    /// Applies a restaurant response. Callers must have checked that the demand is still open.
    pub fn apply_response(&mut self, response: &DemandResponse) {
        self.status = response.status;
        self.responded_at = Some(response.responded_at);
        self.responding_restaurant_id = Some(response.restaurant_id.clone());
        self.restaurant_id = match response.status {
            DemandStatus::Accepted => Some(response.restaurant_id.clone()),
            _ => None,
        };
    }
}

/// The outcome a restaurant chose for an open demand.
#[derive(Clone, Debug, PartialEq)]
pub struct DemandResponse {
    pub status: DemandStatus,
    pub restaurant_id: String,
    pub responded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDemand {
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidDemandFields {
    pub description: String,
    pub quantity: u32,
    pub location: String,
}

impl NewDemand {
    /// Returns the trimmed fields, or the list of offending field names.
    pub fn validate(self) -> Result<ValidDemandFields, Vec<&'static str>> {
        let mut missing = Vec::new();

        let description = non_empty(self.description);
        if description.is_none() {
            missing.push("description");
        }
        let quantity = self.quantity.filter(|q| *q > 0);
        if quantity.is_none() {
            missing.push("quantity");
        }
        let location = non_empty(self.location);
        if location.is_none() {
            missing.push("location");
        }

        match (description, quantity, location) {
            (Some(description), Some(quantity), Some(location)) => Ok(ValidDemandFields {
                description,
                quantity,
                location,
            }),
            _ => Err(missing),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
