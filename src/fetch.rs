// Catalog feeds: HTTP sources, fallbacks, and the refresh client

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{
    fallback_buses, fallback_hotels, fallback_trains, sample_flights, Bus, CatalogItem, Hotel,
    Inventory, Train, TravelKind,
};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{kind} endpoint returned status {status}")]
    Status { kind: TravelKind, status: StatusCode },
}

/// Where each catalog is fetched from. Flights have no endpoint at all; the
/// bundled sample list is their whole catalog.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub trains_url: String,
    pub buses_url: String,
    pub hotels_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            trains_url: "http://localhost:8080/api/trains".to_string(),
            buses_url: "http://localhost:8080/api/buses/".to_string(),
            hotels_url: "http://localhost:8080/hotels".to_string(),
        }
    }
}

/// Seam between the refresh client and the transport, so tests can swap in
/// canned or failing sources.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, kind: TravelKind) -> Result<Vec<CatalogItem>, FetchError>;
}

/// The bus feed's backing model carries no price or availability, so those
/// fields may be absent on the wire and get filled in client-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BusPayload {
    id: u32,
    bus_name: String,
    route: String,
    bus_type: String,
    capacity: u32,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    seats_available: Option<u32>,
    #[serde(default)]
    departure_time: Option<String>,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    destination: Option<String>,
}

/// Fill the gaps the bus feed leaves: a price in the 500..2000 band and a
/// seat count somewhere below capacity, as the original client did.
fn enrich_bus(payload: BusPayload) -> Bus {
    let mut rng = rand::thread_rng();
    Bus {
        id: payload.id,
        bus_name: payload.bus_name,
        route: payload.route,
        bus_type: payload.bus_type,
        capacity: payload.capacity,
        price: payload
            .price
            .unwrap_or_else(|| f64::from(rng.gen_range(500..2000))),
        seats_available: payload
            .seats_available
            .unwrap_or_else(|| rng.gen_range(0..=payload.capacity)),
        departure_time: payload.departure_time.unwrap_or_default(),
        arrival_time: payload.arrival_time.unwrap_or_default(),
        source: payload.source.unwrap_or_default(),
        destination: payload.destination.unwrap_or_default(),
    }
}

/// Production source: JSON over HTTP for trains, buses and hotels.
pub struct HttpCatalogSource {
    client: Client,
    endpoints: EndpointConfig,
}

impl HttpCatalogSource {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self {
            client: Client::new(),
            endpoints,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        kind: TravelKind,
        url: &str,
    ) -> Result<T, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { kind, status });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, kind: TravelKind) -> Result<Vec<CatalogItem>, FetchError> {
        match kind {
            TravelKind::Train => {
                let trains: Vec<Train> = self.get_json(kind, &self.endpoints.trains_url).await?;
                Ok(trains.into_iter().map(CatalogItem::Train).collect())
            }
            TravelKind::Bus => {
                let buses: Vec<BusPayload> =
                    self.get_json(kind, &self.endpoints.buses_url).await?;
                Ok(buses
                    .into_iter()
                    .map(|payload| CatalogItem::Bus(enrich_bus(payload)))
                    .collect())
            }
            TravelKind::Hotel => {
                let hotels: Vec<Hotel> = self.get_json(kind, &self.endpoints.hotels_url).await?;
                Ok(hotels.into_iter().map(CatalogItem::Hotel).collect())
            }
            TravelKind::Flight => Ok(sample_flights()),
        }
    }
}

fn fallback_for(kind: TravelKind) -> Vec<CatalogItem> {
    match kind {
        TravelKind::Train => fallback_trains(),
        TravelKind::Bus => fallback_buses(),
        TravelKind::Hotel => fallback_hotels(),
        TravelKind::Flight => sample_flights(),
    }
}

/// One refresh outcome as the view consumes it: the list to render plus an
/// optional notice when it came from the bundled fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogFeed {
    pub kind: TravelKind,
    pub items: Vec<CatalogItem>,
    pub error: Option<String>,
}

/// Pulls catalogs from a source into the shared inventory. A fetch failure
/// never fails the caller; the feed degrades to the bundled fallback and
/// carries the notice along.
pub struct CatalogClient {
    source: Arc<dyn CatalogSource>,
    inventory: Arc<Inventory>,
    last_updated: RwLock<Option<DateTime<Utc>>>,
}

impl CatalogClient {
    pub fn new(source: Arc<dyn CatalogSource>, inventory: Arc<Inventory>) -> Self {
        Self {
            source,
            inventory,
            last_updated: RwLock::new(None),
        }
    }

    /// When a live fetch last succeeded, if ever. Fallback data does not
    /// count as an update.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.read()
    }

    pub fn inventory(&self) -> Arc<Inventory> {
        Arc::clone(&self.inventory)
    }

    /// Refresh one catalog, replacing that kind's slice of the inventory.
    pub async fn refresh(&self, kind: TravelKind) -> CatalogFeed {
        match self.source.fetch(kind).await {
            Ok(items) => {
                self.inventory.replace_kind(kind, items.clone());
                *self.last_updated.write() = Some(Utc::now());
                info!(%kind, count = items.len(), "catalog refreshed");
                CatalogFeed {
                    kind,
                    items,
                    error: None,
                }
            }
            Err(err) => {
                warn!(%kind, error = %err, "catalog fetch failed, using bundled fallback");
                let items = fallback_for(kind);
                self.inventory.replace_kind(kind, items.clone());
                CatalogFeed {
                    kind,
                    items,
                    error: Some(format!(
                        "Could not reach the {} service. Showing saved results.",
                        kind.to_string().to_lowercase()
                    )),
                }
            }
        }
    }

    /// Refresh all four catalogs concurrently, in `TravelKind::ALL` order.
    pub async fn refresh_all(&self) -> Vec<CatalogFeed> {
        join_all(TravelKind::ALL.iter().map(|kind| self.refresh(*kind))).await
    }
}
