// Main library file for the travel desk

// Export one module per concern
pub mod booking;
pub mod catalog;
pub mod fetch;
pub mod filter;
pub mod form;
pub mod history;
pub mod profile;
pub mod store;

// Re-export key types for convenience
pub use booking::{
    BookingDesk, BookingError, BookingRecord, BookingStatus, CodeAllocator, RandomAllocator,
    SequentialAllocator, StayDates,
};
pub use catalog::{CatalogError, CatalogItem, Inventory, TravelKind};
pub use fetch::{CatalogClient, CatalogFeed, CatalogSource, EndpointConfig, HttpCatalogSource};
pub use filter::FilterState;
pub use form::{BookingForm, BookingRequest, Field, FieldErrors, ValidationError};
pub use history::{HistoryStats, HistoryView};
pub use profile::{Favorites, PackingChecklist, Session, SignUpForm, UserProfile};
pub use store::{BookingRepository, LocalStore, StorageError};
