//! Core service domain types and presentation of service names.

use serde::{Deserialize, Serialize};

/// Database identifier for a service.
pub type ServiceId = i64;

/// A category of expense, e.g. a utility bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// The ID of the service.
    pub id: ServiceId,
    /// The raw service name as stored, e.g. "EXPENSAS_COMUNES".
    #[serde(rename = "nombre")]
    pub name: String,
}

impl Service {
    /// The human readable name, see [display_name].
    pub fn display_name(&self) -> String {
        display_name(&self.name)
    }
}

/// Convert a raw service name such as "GAS_NATURAL" into "Gas Natural".
pub fn display_name(raw_name: &str) -> String {
    if raw_name == "EXPENSAS_EXTRAS" {
        return "Expensas Extraordinarias".to_owned();
    }

    raw_name
        .split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lowercase = word.to_lowercase();
            let mut chars = lowercase.chars();

            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The fixed chart color for the well known services.
///
/// Returns `None` for other services so the chart library picks a color.
pub fn service_color(raw_name: &str) -> Option<&'static str> {
    let color = match raw_name {
        "ARBA" => "#e41a1c",
        "INTERNET" => "#377eb8",
        "EXPENSAS_COMUNES" => "#4daf4a",
        "EXPENSAS_EXTRAS" => "#984ea3",
        "GAS" => "#ff7f00",
        "LUZ" => "#f9e79f",
        "MONOTRIBUTO" => "#a65628",
        "MOVISTAR" => "#f781bf",
        "PERSONAL" => "#999999",
        "PROTECCION_CIUDADANA" => "#66c2a5",
        "TASAS_RETRIBUTIVAS" => "#fc8d62",
        "SERVICIOS_SANITARIOS" => "#8da0cb",
        _ => return None,
    };

    Some(color)
}
