//! Quote sessions: per-visitor form state owned by the server.
//!
//! A session is created when the page mounts and dropped when it unmounts,
//! or once it has been idle longer than the configured TTL.
//! It owns the map view, the route generation counter, the address prefills
//! from autocomplete, and the edit/results view state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shipmates_core::{
    match_couriers, Address, AddressRole, CoreError, CourierQuote, CourierRecord, MetroMembership,
    PriceTier,
};
use shipmates_maps::{MapView, RouteRequest, RouteTicket, RouteTracker};
use tokio::sync::Mutex;
use uuid::Uuid;

/// What the form is currently showing.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Editing,
    Results {
        pickup: Address,
        delivery: Address,
        tier: PriceTier,
        quotes: Vec<CourierQuote>,
    },
}

#[derive(Debug)]
pub struct QuoteSession {
    pub map: MapView,
    tracker: RouteTracker,
    pub pickup: Option<Address>,
    pub delivery: Option<Address>,
    pub view: ViewState,
    pub created_at: DateTime<Utc>,
    /// Bumped on every store access; idle sessions are pruned by it.
    pub last_active_at: DateTime<Utc>,
}

/// Serializable snapshot of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub map: MapView,
    pub pickup: Option<Address>,
    pub delivery: Option<Address>,
    pub route_pending: bool,
    pub view: ViewState,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// Rejections from a session operation.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Addresses can only change while the form is in edit mode.
    NotEditing,
    /// A submit arrived without one of the two address forms.
    MissingForm(AddressRole),
    Invalid(CoreError),
}

impl Default for QuoteSession {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            map: MapView::default(),
            tracker: RouteTracker::default(),
            pickup: None,
            delivery: None,
            view: ViewState::Editing,
            created_at: now,
            last_active_at: now,
        }
    }
}

impl QuoteSession {
    #[must_use]
    pub fn view(&self, id: Uuid) -> SessionView {
        SessionView {
            id,
            map: self.map.clone(),
            pickup: self.pickup.clone(),
            delivery: self.delivery.clone(),
            route_pending: self.tracker.is_pending(),
            view: self.view.clone(),
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        }
    }

    /// Stores a resolved address and, when both place identifiers are known,
    /// starts a route request. Returns the ticket to fetch the route with.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotEditing`] while results are shown.
    pub fn set_address(
        &mut self,
        role: AddressRole,
        address: Address,
    ) -> Result<Option<RouteTicket>, SessionError> {
        if !matches!(self.view, ViewState::Editing) {
            return Err(SessionError::NotEditing);
        }
        match role {
            AddressRole::Pickup => self.pickup = Some(address),
            AddressRole::Delivery => self.delivery = Some(address),
        }

        let (Some(pickup), Some(delivery)) = (&self.pickup, &self.delivery) else {
            return Ok(None);
        };
        let Ok(request) = RouteRequest::new(pickup.place_id.clone(), delivery.place_id.clone())
        else {
            return Ok(None);
        };
        Ok(self.tracker.begin(request))
    }

    /// Applies a finished route request if it is still the latest one.
    /// Returns `false` when the result was superseded and discarded.
    pub fn complete_route(
        &mut self,
        ticket: &RouteTicket,
        outcome: Result<shipmates_maps::RouteOverlay, shipmates_maps::MapsError>,
    ) -> bool {
        if !self.tracker.finish(ticket) {
            return false;
        }
        self.map.apply(outcome);
        true
    }

    /// Toggles the form: in edit mode captures both addresses and prices the
    /// route; in results mode starts over, discarding the captured addresses,
    /// the prefills and the drawn route.
    ///
    /// Form fields override the prefill; the place identifier always comes
    /// from the prefill when the form leaves it blank.
    ///
    /// # Errors
    ///
    /// - [`SessionError::MissingForm`] if an address form is absent in edit mode.
    /// - [`SessionError::Invalid`] if a captured address lacks required fields.
    pub fn submit(
        &mut self,
        pickup_form: Option<Address>,
        delivery_form: Option<Address>,
        couriers: &[CourierRecord],
        metro: &MetroMembership,
    ) -> Result<&ViewState, SessionError> {
        if matches!(self.view, ViewState::Results { .. }) {
            self.tracker.reset();
            self.map.clear();
            self.pickup = None;
            self.delivery = None;
            self.view = ViewState::Editing;
            return Ok(&self.view);
        }

        let pickup = capture(
            AddressRole::Pickup,
            pickup_form,
            self.pickup.as_ref(),
        )?;
        let delivery = capture(
            AddressRole::Delivery,
            delivery_form,
            self.delivery.as_ref(),
        )?;

        let tier = PriceTier::for_route(metro, &pickup, &delivery);
        let quotes = match_couriers(&pickup, &delivery, couriers, metro);
        self.view = ViewState::Results {
            pickup,
            delivery,
            tier,
            quotes,
        };
        Ok(&self.view)
    }
}

fn capture(
    role: AddressRole,
    form: Option<Address>,
    prefill: Option<&Address>,
) -> Result<Address, SessionError> {
    let mut address = form.ok_or(SessionError::MissingForm(role))?.normalized();
    if address.place_id.is_empty() {
        if let Some(prefill) = prefill {
            address.place_id.clone_from(&prefill.place_id);
        }
    }
    address.validate(role).map_err(SessionError::Invalid)?;
    Ok(address)
}

/// Registry of live sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<Uuid, QuoteSession>>>,
}

impl SessionStore {
    pub async fn create(&self) -> SessionView {
        let id = Uuid::new_v4();
        let session = QuoteSession::default();
        let view = session.view(id);
        self.inner.lock().await.insert(id, session);
        tracing::debug!(session_id = %id, "session created");
        view
    }

    /// Returns `true` if a session was removed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.inner.lock().await.remove(&id).is_some();
        if removed {
            tracing::debug!(session_id = %id, "session dropped");
        }
        removed
    }

    /// Runs `f` against the session, or returns `None` if it does not exist.
    /// The store lock is held only for the duration of `f`.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut QuoteSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.inner.lock().await;
        sessions.get_mut(&id).map(|session| {
            session.last_active_at = Utc::now();
            f(session)
        })
    }

    /// Drops every session idle for longer than `ttl`. Returns how many
    /// were removed.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));
        match cutoff {
            Some(cutoff) => self.prune_inactive_since(cutoff).await,
            None => 0,
        }
    }

    /// Drops every session last touched before `cutoff`.
    pub async fn prune_inactive_since(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.inner.lock().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
