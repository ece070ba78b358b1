// Catalog item model and in-memory inventory

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// Errors for catalog lookups and seat reservations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no {kind} item with id {id} in the catalog")]
    UnknownItem { kind: TravelKind, id: u32 },

    #[error("only {left} seats left, {requested} requested")]
    CapacityExceeded { requested: u32, left: u32 },
}

/// Discriminant identifying which catalog variant a booking originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TravelKind {
    Train,
    Bus,
    Flight,
    Hotel,
}

impl TravelKind {
    pub const ALL: [TravelKind; 4] = [
        TravelKind::Train,
        TravelKind::Bus,
        TravelKind::Flight,
        TravelKind::Hotel,
    ];

    /// Heading shown for the kind's booking tab.
    pub fn tab_title(&self) -> &'static str {
        match self {
            TravelKind::Train => "Train Tickets",
            TravelKind::Bus => "Bus Tickets",
            TravelKind::Flight => "Flight Bookings",
            TravelKind::Hotel => "Hotel Reservations",
        }
    }
}

impl fmt::Display for TravelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TravelKind::Train => "Train",
            TravelKind::Bus => "Bus",
            TravelKind::Flight => "Flight",
            TravelKind::Hotel => "Hotel",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Train {
    pub id: u32,
    pub train_name: String,
    pub train_number: String,
    pub source_station: String,
    pub destination_station: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub travel_date: String,
    pub price: f64,
    pub seats_available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bus {
    pub id: u32,
    pub bus_name: String,
    pub route: String,
    pub bus_type: String,
    pub capacity: u32,
    pub price: f64,
    pub seats_available: u32,
    pub departure_time: String,
    pub arrival_time: String,
    pub source: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub id: u32,
    pub flight_name: String,
    pub flight_number: String,
    pub airline: String,
    pub source_airport: String,
    pub destination_airport: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub travel_date: String,
    pub price: f64,
    pub seats_available: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub price: f64,
    pub rating: f64,
    pub room_type: String,
    pub capacity: u32,
    pub amenities: Vec<String>,
}

/// A bookable entity. One shape per discriminant instead of the original's
/// optional-field chaining over `trainName || busName || flightName || name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CatalogItem {
    Train(Train),
    Bus(Bus),
    Flight(Flight),
    Hotel(Hotel),
}

impl CatalogItem {
    pub fn kind(&self) -> TravelKind {
        match self {
            CatalogItem::Train(_) => TravelKind::Train,
            CatalogItem::Bus(_) => TravelKind::Bus,
            CatalogItem::Flight(_) => TravelKind::Flight,
            CatalogItem::Hotel(_) => TravelKind::Hotel,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            CatalogItem::Train(t) => t.id,
            CatalogItem::Bus(b) => b.id,
            CatalogItem::Flight(f) => f.id,
            CatalogItem::Hotel(h) => h.id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            CatalogItem::Train(t) => &t.train_name,
            CatalogItem::Bus(b) => &b.bus_name,
            CatalogItem::Flight(f) => &f.flight_name,
            CatalogItem::Hotel(h) => &h.name,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            CatalogItem::Train(t) => t.price,
            CatalogItem::Bus(b) => b.price,
            CatalogItem::Flight(f) => f.price,
            CatalogItem::Hotel(h) => h.price,
        }
    }

    /// Seats left for seat-based items. Hotels have no seat inventory; their
    /// `capacity` is sleeps-per-room, so this returns `None`.
    pub fn seats_available(&self) -> Option<u32> {
        match self {
            CatalogItem::Train(t) => Some(t.seats_available),
            CatalogItem::Bus(b) => Some(b.seats_available),
            CatalogItem::Flight(f) => Some(f.seats_available),
            CatalogItem::Hotel(_) => None,
        }
    }

    /// Journey date for travel items. Hotels carry stay dates on the booking
    /// instead.
    pub fn travel_date(&self) -> Option<&str> {
        match self {
            CatalogItem::Train(t) => Some(&t.travel_date),
            CatalogItem::Bus(_) => None,
            CatalogItem::Flight(f) => Some(&f.travel_date),
            CatalogItem::Hotel(_) => None,
        }
    }

    fn take_seats(&mut self, count: u32) -> Result<(), CatalogError> {
        let seats = match self {
            CatalogItem::Train(t) => &mut t.seats_available,
            CatalogItem::Bus(b) => &mut b.seats_available,
            CatalogItem::Flight(f) => &mut f.seats_available,
            // No per-room inventory to decrement for hotels
            CatalogItem::Hotel(_) => return Ok(()),
        };
        if count > *seats {
            return Err(CatalogError::CapacityExceeded {
                requested: count,
                left: *seats,
            });
        }
        *seats -= count;
        Ok(())
    }
}

/// In-memory availability state for all four catalogs. Bookings decrement it;
/// it is never written back to the source endpoints, so a refresh or restart
/// resets it to whatever the feed reports.
#[derive(Debug, Default)]
pub struct Inventory {
    items: DashMap<(TravelKind, u32), CatalogItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every item of one kind with a freshly fetched list.
    pub fn replace_kind(&self, kind: TravelKind, items: Vec<CatalogItem>) {
        self.items.retain(|(k, _), _| *k != kind);
        for item in items {
            debug_assert_eq!(item.kind(), kind);
            self.items.insert((kind, item.id()), item);
        }
        debug!(kind = %kind, "inventory replaced");
    }

    pub fn get(&self, kind: TravelKind, id: u32) -> Option<CatalogItem> {
        self.items.get(&(kind, id)).map(|entry| entry.clone())
    }

    /// All items of one kind, ordered by id.
    pub fn items_of(&self, kind: TravelKind) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = self
            .items
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .map(|entry| entry.value().clone())
            .collect();
        items.sort_by_key(|item| item.id());
        items
    }

    /// Take `count` seats off an item, guarding against overselling. Returns
    /// the item as it was before the decrement, which is what gets embedded
    /// in the booking record.
    pub fn reserve(
        &self,
        kind: TravelKind,
        id: u32,
        count: u32,
    ) -> Result<CatalogItem, CatalogError> {
        let mut entry = self
            .items
            .get_mut(&(kind, id))
            .ok_or(CatalogError::UnknownItem { kind, id })?;
        let snapshot = entry.clone();
        entry.take_seats(count)?;
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fallback train list shown when the trains endpoint is unreachable.
pub fn fallback_trains() -> Vec<CatalogItem> {
    vec![
        CatalogItem::Train(Train {
            id: 1,
            train_name: "Rajdhani Express".to_string(),
            train_number: "12301".to_string(),
            source_station: "New Delhi".to_string(),
            destination_station: "Mumbai".to_string(),
            departure_time: "16:55".to_string(),
            arrival_time: "08:15".to_string(),
            travel_date: "2025-04-21".to_string(),
            price: 2100.0,
            seats_available: 42,
        }),
        CatalogItem::Train(Train {
            id: 2,
            train_name: "Shatabdi Express".to_string(),
            train_number: "12002".to_string(),
            source_station: "New Delhi".to_string(),
            destination_station: "Bhopal".to_string(),
            departure_time: "06:15".to_string(),
            arrival_time: "13:30".to_string(),
            travel_date: "2025-04-21".to_string(),
            price: 1500.0,
            seats_available: 0,
        }),
    ]
}

/// Fallback bus list shown when the buses endpoint is unreachable.
pub fn fallback_buses() -> Vec<CatalogItem> {
    vec![
        CatalogItem::Bus(Bus {
            id: 1,
            bus_name: "City Express 101".to_string(),
            route: "Route 101".to_string(),
            bus_type: "AC".to_string(),
            capacity: 50,
            price: 1200.0,
            seats_available: 25,
            departure_time: "10:00".to_string(),
            arrival_time: "16:00".to_string(),
            source: "New Delhi".to_string(),
            destination: "Jaipur".to_string(),
        }),
        CatalogItem::Bus(Bus {
            id: 2,
            bus_name: "Metro Link 205".to_string(),
            route: "Route 102".to_string(),
            bus_type: "Non-AC".to_string(),
            capacity: 40,
            price: 800.0,
            seats_available: 0,
            departure_time: "08:00".to_string(),
            arrival_time: "14:00".to_string(),
            source: "Mumbai".to_string(),
            destination: "Pune".to_string(),
        }),
    ]
}

/// Fallback hotel list shown when the hotels endpoint is unreachable.
pub fn fallback_hotels() -> Vec<CatalogItem> {
    vec![
        CatalogItem::Hotel(Hotel {
            id: 1,
            name: "Grand Plaza Hotel".to_string(),
            location: "New York City".to_string(),
            price: 199.0,
            rating: 4.8,
            room_type: "Deluxe Suite".to_string(),
            capacity: 2,
            amenities: vec!["WiFi".to_string(), "Pool".to_string(), "Spa".to_string()],
        }),
        CatalogItem::Hotel(Hotel {
            id: 2,
            name: "Seaside Resort".to_string(),
            location: "Miami Beach".to_string(),
            price: 299.0,
            rating: 4.5,
            room_type: "Ocean View Suite".to_string(),
            capacity: 3,
            amenities: vec![
                "Beach Access".to_string(),
                "Pool".to_string(),
                "Restaurant".to_string(),
            ],
        }),
        CatalogItem::Hotel(Hotel {
            id: 3,
            name: "Mountain Lodge".to_string(),
            location: "Aspen".to_string(),
            price: 399.0,
            rating: 4.9,
            room_type: "Luxury Chalet".to_string(),
            capacity: 4,
            amenities: vec![
                "Fireplace".to_string(),
                "Ski Access".to_string(),
                "Hot Tub".to_string(),
            ],
        }),
    ]
}

/// Flights have no backing endpoint; this fixed list is the whole catalog.
pub fn sample_flights() -> Vec<CatalogItem> {
    vec![
        CatalogItem::Flight(Flight {
            id: 1,
            flight_name: "Air India Express".to_string(),
            flight_number: "AI505".to_string(),
            airline: "Air India".to_string(),
            source_airport: "DEL".to_string(),
            destination_airport: "BOM".to_string(),
            departure_time: "06:00".to_string(),
            arrival_time: "08:30".to_string(),
            duration: "2h 30m".to_string(),
            travel_date: "2025-04-21".to_string(),
            price: 5200.0,
            seats_available: 45,
        }),
        CatalogItem::Flight(Flight {
            id: 2,
            flight_name: "IndiGo Airways".to_string(),
            flight_number: "6E321".to_string(),
            airline: "IndiGo".to_string(),
            source_airport: "BLR".to_string(),
            destination_airport: "DEL".to_string(),
            departure_time: "09:15".to_string(),
            arrival_time: "12:00".to_string(),
            duration: "2h 45m".to_string(),
            travel_date: "2025-04-21".to_string(),
            price: 4800.0,
            seats_available: 32,
        }),
    ]
}
