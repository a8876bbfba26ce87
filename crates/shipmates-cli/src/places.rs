//! Maps commands: autocomplete, place resolution and routing.

use shipmates_core::MapsSettings;
use shipmates_maps::{resolve_place, MapView, MapsClient, RouteRequest};

fn maps_client(settings: &MapsSettings) -> anyhow::Result<MapsClient> {
    Ok(MapsClient::new(
        &settings.api_key,
        &settings.country_restriction,
        settings.http_timeout_secs,
    )?)
}

pub(crate) async fn run_autocomplete(settings: &MapsSettings, input: &str) -> anyhow::Result<()> {
    let predictions = maps_client(settings)?.autocomplete(input).await?;
    if predictions.is_empty() {
        println!("no suggestions for '{input}'");
        return Ok(());
    }
    for prediction in &predictions {
        println!("{:<40}{}", prediction.place_id, prediction.description);
    }
    Ok(())
}

/// Print the address a place resolves to, flagging blank required fields.
///
/// # Errors
///
/// Returns an error if the place lookup fails or the place has no address
/// components.
pub(crate) async fn run_resolve(settings: &MapsSettings, place_id: &str) -> anyhow::Result<()> {
    let place = maps_client(settings)?.place_details(place_id).await?;
    let address = resolve_place(&place)?;

    println!("{address}");
    let missing = address.missing_required_fields();
    if !missing.is_empty() {
        eprintln!("warning: missing {}", missing.join(", "));
    }
    Ok(())
}

/// Print the driving route between two places, or the alert a failed
/// request would raise on the map.
///
/// # Errors
///
/// Returns an error if either identifier is blank or the client cannot be
/// built. Provider failures are reported as the map alert, not an error.
pub(crate) async fn run_route(
    settings: &MapsSettings,
    origin: &str,
    destination: &str,
) -> anyhow::Result<()> {
    let request = RouteRequest::new(origin, destination)?;
    let outcome = maps_client(settings)?.directions(&request).await;

    let mut view = MapView::default();
    view.apply(outcome);

    if let Some(alert) = &view.alert {
        println!("{alert}");
        return Ok(());
    }
    if let Some(route) = &view.route {
        println!("via {}", route.summary);
        println!(
            "distance: {}",
            route
                .distance_text
                .clone()
                .unwrap_or_else(|| format!("{} m", route.distance_meters))
        );
        println!(
            "duration: {}",
            route
                .duration_text
                .clone()
                .unwrap_or_else(|| format!("{} s", route.duration_seconds))
        );
    }
    Ok(())
}
