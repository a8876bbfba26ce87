//! Courier catalog commands.

use rust_decimal::Decimal;
use shipmates_core::{match_couriers, Address, NotionSettings, PriceTier};
use shipmates_notion::NotionClient;

fn notion_client(settings: &NotionSettings) -> anyhow::Result<NotionClient> {
    Ok(NotionClient::new(
        &settings.api_key,
        settings.http_timeout_secs,
    )?)
}

pub(crate) fn format_price(price: Option<Decimal>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("PHP {p}"))
}

/// Print every courier row with both prices.
///
/// # Errors
///
/// Returns an error if the content database cannot be queried.
pub(crate) async fn run_list(settings: &NotionSettings) -> anyhow::Result<()> {
    let couriers = notion_client(settings)?
        .fetch_couriers(&settings.database_id)
        .await?;

    if couriers.is_empty() {
        println!("no couriers found in database {}", settings.database_id);
        return Ok(());
    }

    println!("{:<28}{:<16}OUTSIDE METRO", "COURIER", "METRO");
    for courier in &couriers {
        println!(
            "{:<28}{:<16}{}",
            courier.name,
            format_price(courier.metro_price),
            format_price(courier.outside_metro_price)
        );
    }
    Ok(())
}

/// Print the couriers that serve a pickup → delivery province pair.
///
/// # Errors
///
/// Returns an error if the content database cannot be queried.
pub(crate) async fn run_quote(
    settings: &NotionSettings,
    pickup_province: &str,
    delivery_province: &str,
) -> anyhow::Result<()> {
    let pickup = province_only(pickup_province);
    let delivery = province_only(delivery_province);

    let couriers = notion_client(settings)?
        .fetch_couriers(&settings.database_id)
        .await?;
    let quotes = match_couriers(&pickup, &delivery, &couriers, &settings.metro);
    tracing::debug!(
        catalog = couriers.len(),
        matched = quotes.len(),
        "matched couriers"
    );

    let tier = match PriceTier::for_route(&settings.metro, &pickup, &delivery) {
        PriceTier::Metro => "within metro",
        PriceTier::OutsideMetro => "outside metro",
    };
    println!("{pickup_province} -> {delivery_province} ({tier})");

    if quotes.is_empty() {
        println!("no courier serves this route");
        return Ok(());
    }

    println!("{:<28}PRICE", "COURIER");
    for quote in &quotes {
        println!("{:<28}{}", quote.name, format_price(quote.price));
    }
    Ok(())
}

pub(crate) fn province_only(province: &str) -> Address {
    Address {
        province: province.trim().to_owned(),
        ..Address::default()
    }
}
