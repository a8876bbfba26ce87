use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Which side of the shipment an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressRole {
    Pickup,
    Delivery,
}

impl std::fmt::Display for AddressRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressRole::Pickup => write!(f, "pickup"),
            AddressRole::Delivery => write!(f, "delivery"),
        }
    }
}

/// A structured address, either prefilled from a resolved place or captured
/// from the submitted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Unit, floor or suite. Never provided by the places service.
    #[serde(default)]
    pub unit: Option<String>,
    /// Street line, e.g. `"SM Megamall Julia Vargas Avenue"`.
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
    /// Opaque place identifier issued by the maps provider.
    #[serde(default)]
    pub place_id: String,
}

impl Address {
    /// Names of the form-required fields that are blank.
    ///
    /// Locality, province, postal code and country are required; unit and
    /// street are optional.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("locality", &self.locality),
            ("province", &self.province),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompleteAddress`] naming the blank fields.
    pub fn validate(&self, role: AddressRole) -> Result<(), CoreError> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::IncompleteAddress { role, missing })
        }
    }

    /// Trims surrounding whitespace and collapses a blank unit to `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            unit: self
                .unit
                .map(|u| u.trim().to_owned())
                .filter(|u| !u.is_empty()),
            street: self.street.trim().to_owned(),
            locality: self.locality.trim().to_owned(),
            province: self.province.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            country: self.country.trim().to_owned(),
            place_id: self.place_id.trim().to_owned(),
        }
    }

    /// Single-line summary shown once the form is submitted.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let unit = self
            .unit
            .as_deref()
            .map(|u| format!("{u} "))
            .unwrap_or_default();
        format!(
            "{unit}{}, {}, {}, {}, {}",
            self.street, self.locality, self.postal_code, self.province, self.country
        )
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary_line())
    }
}
