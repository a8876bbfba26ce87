use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::metro::MetroMembership;

/// One courier row from the content database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierRecord {
    /// Opaque row identifier from the content database.
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    /// Price when both ends are inside the metro area.
    pub metro_price: Option<Decimal>,
    /// Price for any route touching a non-metro province. A present value,
    /// including zero, also marks the courier as able to deliver outside
    /// the metro area.
    pub outside_metro_price: Option<Decimal>,
}

impl CourierRecord {
    #[must_use]
    pub fn serves_outside_metro(&self) -> bool {
        self.outside_metro_price.is_some()
    }
}

/// Which price field applies to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    Metro,
    OutsideMetro,
}

impl PriceTier {
    /// Classifies a route by the provinces at both ends.
    #[must_use]
    pub fn for_route(metro: &MetroMembership, pickup: &Address, delivery: &Address) -> Self {
        if metro.covers_route(&pickup.province, &delivery.province) {
            PriceTier::Metro
        } else {
            PriceTier::OutsideMetro
        }
    }
}

/// A courier eligible for a route, with the applicable price attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourierQuote {
    pub courier_id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub tier: PriceTier,
    /// `None` only for a metro route whose courier has no metro price set.
    pub price: Option<Decimal>,
}

/// Immutable set of courier records as of one content-database fetch.
#[derive(Debug, Clone, Serialize)]
pub struct CourierSnapshot {
    pub couriers: Vec<CourierRecord>,
    pub fetched_at: DateTime<Utc>,
}

impl CourierSnapshot {
    #[must_use]
    pub fn new(couriers: Vec<CourierRecord>) -> Self {
        Self {
            couriers,
            fetched_at: Utc::now(),
        }
    }
}

/// Selects the couriers that can serve `pickup` → `delivery` and attaches
/// the price for the route's tier.
///
/// A courier is eligible when it serves outside the metro area, or when both
/// provinces are metro members. Input order is preserved.
#[must_use]
pub fn match_couriers(
    pickup: &Address,
    delivery: &Address,
    couriers: &[CourierRecord],
    metro: &MetroMembership,
) -> Vec<CourierQuote> {
    let tier = PriceTier::for_route(metro, pickup, delivery);

    couriers
        .iter()
        .filter(|c| c.serves_outside_metro() || tier == PriceTier::Metro)
        .map(|c| CourierQuote {
            courier_id: c.id.clone(),
            name: c.name.clone(),
            logo_url: c.logo_url.clone(),
            tier,
            price: match tier {
                PriceTier::Metro => c.metro_price,
                PriceTier::OutsideMetro => c.outside_metro_price,
            },
        })
        .collect()
}
