// Booking records and the confirmation service

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{CatalogError, CatalogItem, Inventory, TravelKind};
use crate::form::BookingRequest;
use crate::store::{BookingRepository, StorageError};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Pending,
}

/// Details attached once the confirmation service has allocated codes.
/// Bus bookings carry none, matching the original record shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationDetails {
    pub reference: String,
    pub booking_time: DateTime<Utc>,
    pub payment_status: BookingStatus,
    pub seat_numbers: Vec<String>,
}

/// Kind-specific fields synthesized at confirmation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingExtras {
    Train {
        platform: u32,
        class: String,
        duration: String,
    },
    Flight {
        terminal: u32,
        gate: String,
        class: String,
    },
    Hotel {
        nights: u32,
        room_number: String,
        check_in: String,
        check_out: String,
    },
    Bus,
}

/// The persisted result of a confirmed booking. Created exactly once,
/// appended to the booking list, never updated or deleted. The originating
/// item is embedded as a denormalized snapshot; there is no referential
/// integrity with the live catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    pub booking_id: String,
    pub kind: TravelKind,
    pub passenger_name: String,
    pub email: String,
    pub phone_number: String,
    pub seat_count: u32,
    pub status: BookingStatus,
    pub total_amount: f64,
    pub booked_at: DateTime<Utc>,
    pub item: CatalogItem,
    pub details: Option<ConfirmationDetails>,
    pub extras: BookingExtras,
}

impl BookingRecord {
    /// The timestamp the history view sorts by: the nested booking time when
    /// present, the top-level creation timestamp otherwise.
    pub fn effective_time(&self) -> DateTime<Utc> {
        self.details
            .as_ref()
            .map(|details| details.booking_time)
            .unwrap_or(self.booked_at)
    }

    /// Journey date of the embedded item, if it has one.
    pub fn journey_date(&self) -> Option<&str> {
        self.item.travel_date()
    }
}

/// Hotel stay dates taken from the search panel. When absent, the stay
/// defaults to tonight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: String,
    pub check_out: String,
}

/// Source of booking ids, reference codes and seat/room assignments.
pub trait CodeAllocator: Send + Sync {
    fn booking_id(&self) -> String;
    fn reference(&self, kind: TravelKind) -> String;
    fn train_seats(&self, count: u32) -> Vec<String>;
    fn flight_seats(&self, count: u32) -> Vec<String>;
    fn room_number(&self) -> String;
    fn platform(&self) -> u32;
    fn terminal(&self) -> u32;
    fn gate(&self) -> String;
}

fn reference_prefix(kind: TravelKind) -> &'static str {
    match kind {
        TravelKind::Train => "PNR",
        TravelKind::Flight => "FL",
        TravelKind::Hotel => "HB",
        TravelKind::Bus => "BK",
    }
}

const TRAIN_COACHES: [char; 4] = ['A', 'B', 'C', 'D'];
const FLIGHT_COLUMNS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];

/// Monotonic allocator: every code is derived from a single counter, so two
/// bookings can never collide. This is the default.
#[derive(Debug, Default)]
pub struct SequentialAllocator {
    next: AtomicU64,
}

impl SequentialAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn take(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl CodeAllocator for SequentialAllocator {
    fn booking_id(&self) -> String {
        format!("BK{:010}", self.take())
    }

    fn reference(&self, kind: TravelKind) -> String {
        format!("{}{:010}", reference_prefix(kind), self.take())
    }

    fn train_seats(&self, count: u32) -> Vec<String> {
        (0..count)
            .map(|_| {
                let n = self.take();
                let coach = TRAIN_COACHES[(n % 4) as usize];
                format!("{}{}", coach, n % 72 + 1)
            })
            .collect()
    }

    fn flight_seats(&self, count: u32) -> Vec<String> {
        let mut seats: Vec<String> = (0..count)
            .map(|_| {
                let n = self.take();
                format!("{}{}", n % 30 + 1, FLIGHT_COLUMNS[(n % 6) as usize])
            })
            .collect();
        seats.sort();
        seats
    }

    fn room_number(&self) -> String {
        let n = self.take();
        format!("{}{:02}", n % 9 + 1, n % 20 + 1)
    }

    fn platform(&self) -> u32 {
        (self.take() % 10 + 1) as u32
    }

    fn terminal(&self) -> u32 {
        (self.take() % 3 + 1) as u32
    }

    fn gate(&self) -> String {
        let n = self.take();
        char::from(b'A' + (n % 26) as u8).to_string()
    }
}

/// Allocator reproducing the original client's random codes: a ten-digit
/// decimal after the prefix, random coach/row/floor picks. Collisions are
/// possible; prefer [`SequentialAllocator`] unless record shapes must match
/// data written by the original app.
#[derive(Debug, Default)]
pub struct RandomAllocator;

impl CodeAllocator for RandomAllocator {
    fn booking_id(&self) -> String {
        format!("BK{}", Utc::now().timestamp_millis())
    }

    fn reference(&self, kind: TravelKind) -> String {
        let n = rand::thread_rng().gen_range(1_000_000_000u64..10_000_000_000u64);
        format!("{}{}", reference_prefix(kind), n)
    }

    fn train_seats(&self, count: u32) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|_| {
                let coach = TRAIN_COACHES[rng.gen_range(0..TRAIN_COACHES.len())];
                format!("{}{}", coach, rng.gen_range(1..=72))
            })
            .collect()
    }

    fn flight_seats(&self, count: u32) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut seats: Vec<String> = (0..count)
            .map(|_| {
                let row = rng.gen_range(1..=30);
                let column = FLIGHT_COLUMNS[rng.gen_range(0..FLIGHT_COLUMNS.len())];
                format!("{}{}", row, column)
            })
            .collect();
        seats.sort();
        seats
    }

    fn room_number(&self) -> String {
        let mut rng = rand::thread_rng();
        format!("{}{:02}", rng.gen_range(1..=9), rng.gen_range(1..=20))
    }

    fn platform(&self) -> u32 {
        rand::thread_rng().gen_range(1..=10)
    }

    fn terminal(&self) -> u32 {
        rand::thread_rng().gen_range(1..=3)
    }

    fn gate(&self) -> String {
        char::from(b'A' + rand::thread_rng().gen_range(0..26u8)).to_string()
    }
}

/// Nights between two `YYYY-MM-DD` dates, never less than one. Missing or
/// unparseable dates fall back to a single night.
pub fn nights_between(check_in: &str, check_out: &str) -> u32 {
    let parse = |value: &str| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok();
    match (parse(check_in), parse(check_out)) {
        (Some(check_in), Some(check_out)) => {
            let nights = (check_out - check_in).num_days();
            if nights >= 1 {
                nights as u32
            } else {
                1
            }
        }
        _ => 1,
    }
}

/// `HH:MM` pair to an `XhYm` travel duration, wrapping past midnight.
pub fn duration_between(departure: &str, arrival: &str) -> String {
    fn clock(value: &str) -> Option<(i32, i32)> {
        let (hours, minutes) = value.split_once(':')?;
        Some((hours.parse().ok()?, minutes.parse().ok()?))
    }
    match (clock(departure), clock(arrival)) {
        (Some((dep_h, dep_m)), Some((arr_h, arr_m))) => {
            let mut hours = arr_h - dep_h;
            let mut minutes = arr_m - dep_m;
            if minutes < 0 {
                hours -= 1;
                minutes += 60;
            }
            if hours < 0 {
                hours += 24;
            }
            format!("{}h {}m", hours, minutes)
        }
        _ => String::new(),
    }
}

fn default_stay() -> StayDates {
    let today = Utc::now().date_naive();
    StayDates {
        check_in: today.format("%Y-%m-%d").to_string(),
        check_out: (today + Duration::days(1)).format("%Y-%m-%d").to_string(),
    }
}

/// The confirmation service: merges a validated request with the originating
/// item, synthesizes kind-specific fields, appends the record to the
/// persisted list and decrements in-memory availability.
pub struct BookingDesk {
    repo: BookingRepository,
    inventory: Arc<Inventory>,
    allocator: Arc<dyn CodeAllocator>,
}

impl BookingDesk {
    pub fn new(repo: BookingRepository, inventory: Arc<Inventory>) -> Self {
        Self::with_allocator(repo, inventory, Arc::new(SequentialAllocator::new()))
    }

    pub fn with_allocator(
        repo: BookingRepository,
        inventory: Arc<Inventory>,
        allocator: Arc<dyn CodeAllocator>,
    ) -> Self {
        Self {
            repo,
            inventory,
            allocator,
        }
    }

    /// Confirm a booking for one catalog item. Capacity is re-checked against
    /// the current in-memory inventory before anything is written, so a stale
    /// form cannot oversell. The record is persisted first, then availability
    /// is decremented; the decrement is never written back to the catalog
    /// source, so a refresh resets it.
    pub fn confirm(
        &self,
        request: BookingRequest,
        kind: TravelKind,
        item_id: u32,
        stay: Option<StayDates>,
    ) -> Result<BookingRecord, BookingError> {
        let item = self
            .inventory
            .get(kind, item_id)
            .ok_or(CatalogError::UnknownItem { kind, id: item_id })?;

        if let Some(left) = item.seats_available() {
            if request.seat_count > left {
                warn!(
                    %kind,
                    item_id,
                    requested = request.seat_count,
                    left,
                    "booking rejected: capacity exceeded"
                );
                return Err(CatalogError::CapacityExceeded {
                    requested: request.seat_count,
                    left,
                }
                .into());
            }
        }

        let now = Utc::now();
        let (extras, details, total_amount) = match &item {
            CatalogItem::Train(train) => (
                BookingExtras::Train {
                    platform: self.allocator.platform(),
                    class: "Standard".to_string(),
                    duration: duration_between(&train.departure_time, &train.arrival_time),
                },
                Some(ConfirmationDetails {
                    reference: self.allocator.reference(kind),
                    booking_time: now,
                    payment_status: BookingStatus::Confirmed,
                    seat_numbers: self.allocator.train_seats(request.seat_count),
                }),
                train.price * f64::from(request.seat_count),
            ),
            CatalogItem::Flight(flight) => (
                BookingExtras::Flight {
                    terminal: self.allocator.terminal(),
                    gate: self.allocator.gate(),
                    class: "Economy".to_string(),
                },
                Some(ConfirmationDetails {
                    reference: self.allocator.reference(kind),
                    booking_time: now,
                    payment_status: BookingStatus::Confirmed,
                    seat_numbers: self.allocator.flight_seats(request.seat_count),
                }),
                flight.price * f64::from(request.seat_count),
            ),
            CatalogItem::Hotel(hotel) => {
                let stay = stay.unwrap_or_else(default_stay);
                let nights = nights_between(&stay.check_in, &stay.check_out);
                (
                    BookingExtras::Hotel {
                        nights,
                        room_number: self.allocator.room_number(),
                        check_in: stay.check_in,
                        check_out: stay.check_out,
                    },
                    Some(ConfirmationDetails {
                        reference: self.allocator.reference(kind),
                        booking_time: now,
                        payment_status: BookingStatus::Confirmed,
                        seat_numbers: Vec::new(),
                    }),
                    hotel.price * f64::from(nights),
                )
            }
            CatalogItem::Bus(bus) => (
                BookingExtras::Bus,
                None,
                bus.price * f64::from(request.seat_count),
            ),
        };

        let record = BookingRecord {
            booking_id: self.allocator.booking_id(),
            kind,
            passenger_name: request.passenger_name,
            email: request.email,
            phone_number: request.phone_number,
            seat_count: request.seat_count,
            status: BookingStatus::Confirmed,
            total_amount,
            booked_at: now,
            item,
            details,
            extras,
        };

        self.repo.append(record.clone())?;
        self.inventory.reserve(kind, item_id, record.seat_count)?;
        debug!(booking_id = %record.booking_id, %kind, "booking confirmed");

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fallback_hotels, sample_flights, Train};
    use crate::store::tests::temp_store;
    use test_case::test_case;

    fn request(seats: u32) -> BookingRequest {
        BookingRequest {
            passenger_name: "Asha Verma".to_string(),
            email: "asha@example.com".to_string(),
            phone_number: "9876543210".to_string(),
            seat_count: seats,
        }
    }

    fn train_with_seats(price: f64, seats: u32) -> CatalogItem {
        CatalogItem::Train(Train {
            id: 7,
            train_name: "Shatabdi Express".to_string(),
            train_number: "12002".to_string(),
            source_station: "New Delhi".to_string(),
            destination_station: "Bhopal".to_string(),
            departure_time: "06:15".to_string(),
            arrival_time: "13:30".to_string(),
            travel_date: "2025-04-21".to_string(),
            price,
            seats_available: seats,
        })
    }

    fn desk_with(items: Vec<CatalogItem>, kind: TravelKind) -> (BookingDesk, BookingRepository) {
        let store = temp_store();
        let repo = BookingRepository::new(store);
        let inventory = Arc::new(Inventory::new());
        inventory.replace_kind(kind, items);
        (BookingDesk::new(repo.clone(), inventory), repo)
    }

    #[test]
    fn test_confirm_appends_one_record_and_decrements_seats() {
        let (desk, repo) = desk_with(
            vec![train_with_seats(1500.0, 5)],
            TravelKind::Train,
        );

        let record = desk
            .confirm(request(2), TravelKind::Train, 7, None)
            .unwrap();

        assert_eq!(record.total_amount, 3000.0);
        // The embedded snapshot shows availability as it was before booking
        assert_eq!(record.item.seats_available(), Some(5));
        // The live inventory took the decrement
        let live = desk.inventory.get(TravelKind::Train, 7).unwrap();
        assert_eq!(live.seats_available(), Some(3));

        let persisted = repo.load().unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0], record);
    }

    #[test]
    fn test_capacity_is_rechecked_at_confirmation() {
        let (desk, repo) = desk_with(
            vec![train_with_seats(1500.0, 5)],
            TravelKind::Train,
        );

        let result = desk.confirm(request(6), TravelKind::Train, 7, None);
        match result {
            Err(BookingError::Catalog(CatalogError::CapacityExceeded { requested, left })) => {
                assert_eq!((requested, left), (6, 5));
            }
            other => panic!("expected capacity error, got {:?}", other),
        }

        // A rejected booking must leave no trace
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let (desk, _repo) = desk_with(vec![], TravelKind::Train);
        let result = desk.confirm(request(1), TravelKind::Train, 42, None);
        assert!(matches!(
            result,
            Err(BookingError::Catalog(CatalogError::UnknownItem { .. }))
        ));
    }

    #[test]
    fn test_hotel_total_uses_nights() {
        let (desk, _repo) = desk_with(fallback_hotels(), TravelKind::Hotel);
        let stay = StayDates {
            check_in: "2025-04-20".to_string(),
            check_out: "2025-04-23".to_string(),
        };

        // Grand Plaza Hotel: 199.0 per night
        let record = desk
            .confirm(request(2), TravelKind::Hotel, 1, Some(stay))
            .unwrap();

        match &record.extras {
            BookingExtras::Hotel {
                nights,
                room_number,
                check_in,
                check_out,
            } => {
                assert_eq!(*nights, 3);
                assert_eq!(check_in, "2025-04-20");
                assert_eq!(check_out, "2025-04-23");
                let floor: u32 = room_number[..1].parse().unwrap();
                assert!((1..=9).contains(&floor));
            }
            other => panic!("expected hotel extras, got {:?}", other),
        }
        assert_eq!(record.total_amount, 199.0 * 3.0);
    }

    #[test]
    fn test_hotel_stay_defaults_to_one_night() {
        let (desk, _repo) = desk_with(fallback_hotels(), TravelKind::Hotel);
        let record = desk
            .confirm(request(2), TravelKind::Hotel, 2, None)
            .unwrap();
        match &record.extras {
            BookingExtras::Hotel { nights, .. } => assert_eq!(*nights, 1),
            other => panic!("expected hotel extras, got {:?}", other),
        }
        assert_eq!(record.total_amount, 299.0);
    }

    #[test]
    fn test_flight_extras_are_within_airport_ranges() {
        let (desk, _repo) = desk_with(sample_flights(), TravelKind::Flight);
        let record = desk
            .confirm(request(3), TravelKind::Flight, 1, None)
            .unwrap();

        match &record.extras {
            BookingExtras::Flight {
                terminal,
                gate,
                class,
            } => {
                assert!((1..=3).contains(terminal));
                assert_eq!(gate.len(), 1);
                assert!(gate.chars().all(|c| c.is_ascii_uppercase()));
                assert_eq!(class, "Economy");
            }
            other => panic!("expected flight extras, got {:?}", other),
        }

        let details = record.details.as_ref().unwrap();
        assert!(details.reference.starts_with("FL"));
        assert_eq!(details.seat_numbers.len(), 3);
        let mut sorted = details.seat_numbers.clone();
        sorted.sort();
        assert_eq!(details.seat_numbers, sorted);
    }

    #[test]
    fn test_bus_booking_has_no_confirmation_details() {
        let (desk, _repo) = desk_with(crate::catalog::fallback_buses(), TravelKind::Bus);
        let record = desk.confirm(request(2), TravelKind::Bus, 1, None).unwrap();
        assert_eq!(record.extras, BookingExtras::Bus);
        assert!(record.details.is_none());
        assert_eq!(record.total_amount, 2400.0);
        assert_eq!(record.effective_time(), record.booked_at);
    }

    #[test]
    fn test_train_details_carry_pnr_platform_and_duration() {
        let (desk, _repo) = desk_with(
            vec![train_with_seats(2100.0, 42)],
            TravelKind::Train,
        );
        let record = desk.confirm(request(1), TravelKind::Train, 7, None).unwrap();

        match &record.extras {
            BookingExtras::Train {
                platform,
                class,
                duration,
            } => {
                assert!((1..=10).contains(platform));
                assert_eq!(class, "Standard");
                assert_eq!(duration, "7h 15m");
            }
            other => panic!("expected train extras, got {:?}", other),
        }
        let details = record.details.as_ref().unwrap();
        assert!(details.reference.starts_with("PNR"));
        assert_eq!(details.seat_numbers.len(), 1);
    }

    #[test_case("2025-04-20", "2025-04-23", 3; "#1 three nights")]
    #[test_case("2025-04-20", "2025-04-21", 1; "#2 one night")]
    #[test_case("2025-04-20", "2025-04-20", 1; "#3 same day clamps to one")]
    #[test_case("2025-04-23", "2025-04-20", 1; "#4 reversed dates clamp to one")]
    #[test_case("", "2025-04-23", 1; "#5 missing check-in")]
    #[test_case("not-a-date", "2025-04-23", 1; "#6 invalid check-in")]
    fn test_nights_between(check_in: &str, check_out: &str, expected: u32) {
        assert_eq!(nights_between(check_in, check_out), expected);
    }

    #[test_case("06:15", "13:30", "7h 15m"; "#1 same day")]
    #[test_case("16:55", "08:15", "15h 20m"; "#2 wraps past midnight")]
    #[test_case("10:30", "10:30", "0h 0m"; "#3 zero duration")]
    #[test_case("oops", "13:30", ""; "#4 unparseable input")]
    fn test_duration_between(departure: &str, arrival: &str, expected: &str) {
        assert_eq!(duration_between(departure, arrival), expected);
    }

    #[test]
    fn test_sequential_allocator_is_deterministic() {
        let a = SequentialAllocator::new();
        let b = SequentialAllocator::new();
        assert_eq!(a.booking_id(), b.booking_id());
        assert_eq!(
            a.reference(TravelKind::Train),
            b.reference(TravelKind::Train)
        );
        assert_eq!(a.train_seats(2), b.train_seats(2));
    }

    #[test]
    fn test_sequential_allocator_never_repeats_codes() {
        let allocator = SequentialAllocator::new();
        let first = allocator.reference(TravelKind::Hotel);
        let second = allocator.reference(TravelKind::Hotel);
        assert!(first.starts_with("HB"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_random_allocator_stays_in_original_ranges() {
        let allocator = RandomAllocator;
        for seat in allocator.train_seats(20) {
            let coach = seat.chars().next().unwrap();
            assert!(TRAIN_COACHES.contains(&coach), "bad coach in {}", seat);
            let number: u32 = seat[1..].parse().unwrap();
            assert!((1..=72).contains(&number), "bad seat in {}", seat);
        }
        let reference = allocator.reference(TravelKind::Train);
        assert!(reference.starts_with("PNR"));
        assert_eq!(reference.len(), "PNR".len() + 10);
    }
}
