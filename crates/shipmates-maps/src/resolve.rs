//! Turns a place result into a structured [`Address`].

use shipmates_core::Address;

use crate::error::ResolveError;
use crate::types::{AddressComponent, PlaceResult};

/// Address slot filled by a component, keyed by the component's primary type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressField {
    Street,
    PostalCode,
    Locality,
    Province,
    Country,
}

impl AddressField {
    fn classify(component: &AddressComponent) -> Option<Self> {
        match component.types.first().map(String::as_str)? {
            "route" => Some(Self::Street),
            "postal_code" => Some(Self::PostalCode),
            "locality" => Some(Self::Locality),
            "administrative_area_level_1" => Some(Self::Province),
            "country" => Some(Self::Country),
            _ => None,
        }
    }
}

/// Builds an address from a place's typed components.
///
/// The street line joins the place name with the route's long name
/// (`"SM Megamall EDSA"`). Postal code, locality and province take the
/// short form; country takes the long form. Components whose primary type
/// is not one of those are ignored, and a later component of the same type
/// overwrites an earlier one.
///
/// # Errors
///
/// - [`ResolveError::MissingComponents`] if the place carries no
///   `address_components` at all.
/// - [`ResolveError::MissingPlaceId`] if the place has no identifier.
pub fn resolve_place(place: &PlaceResult) -> Result<Address, ResolveError> {
    let components = place
        .address_components
        .as_ref()
        .ok_or(ResolveError::MissingComponents)?;
    let place_id = place
        .place_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(ResolveError::MissingPlaceId)?;

    let mut address = Address {
        place_id: place_id.to_owned(),
        ..Address::default()
    };

    for component in components {
        match AddressField::classify(component) {
            Some(AddressField::Street) => {
                address.street = street_line(place.name.as_deref(), &component.long_name);
            }
            Some(AddressField::PostalCode) => address.postal_code.clone_from(&component.short_name),
            Some(AddressField::Locality) => address.locality.clone_from(&component.short_name),
            Some(AddressField::Province) => address.province.clone_from(&component.short_name),
            Some(AddressField::Country) => address.country.clone_from(&component.long_name),
            None => {}
        }
    }

    let missing = address.missing_required_fields();
    if !missing.is_empty() {
        tracing::debug!(place_id, ?missing, "resolved place lacks some address fields");
    }

    Ok(address)
}

fn street_line(name: Option<&str>, route: &str) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) if name != route => format!("{name} {route}"),
        _ => route.to_owned(),
    }
}
