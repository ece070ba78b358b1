// Filter engine: pure predicates over the catalog list

use crate::catalog::CatalogItem;

/// User-entered filter state. Empty text fields, `None` bounds and the
/// `"all"`/empty category sentinel all match everything, so a default state
/// is the identity filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub search_term: String,
    pub source: String,
    pub destination: String,
    pub date: String,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    /// Bus type, airline, or a minimum hotel rating, depending on the kind.
    pub category: String,
}

impl FilterState {
    fn category_active(&self) -> bool {
        !self.category.is_empty() && self.category != "all"
    }
}

/// Case-insensitive substring match; an empty filter value matches everything.
fn text_matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || value.to_lowercase().contains(&filter.to_lowercase())
}

fn range_matches<T: PartialOrd + Copy>(min: Option<T>, max: Option<T>, value: T) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}

/// Whether one item passes every active filter. All fields participate in a
/// logical AND.
pub fn matches(item: &CatalogItem, filters: &FilterState) -> bool {
    let source_ok = match item {
        CatalogItem::Train(t) => text_matches(&filters.source, &t.source_station),
        CatalogItem::Bus(b) => text_matches(&filters.source, &b.source),
        CatalogItem::Flight(f) => text_matches(&filters.source, &f.source_airport),
        CatalogItem::Hotel(h) => text_matches(&filters.source, &h.location),
    };
    if !source_ok {
        return false;
    }

    let destination_ok = match item {
        CatalogItem::Train(t) => text_matches(&filters.destination, &t.destination_station),
        CatalogItem::Bus(b) => text_matches(&filters.destination, &b.destination),
        CatalogItem::Flight(f) => text_matches(&filters.destination, &f.destination_airport),
        // Hotels are a single location, not a route
        CatalogItem::Hotel(_) => true,
    };
    if !destination_ok {
        return false;
    }

    let search_ok = match item {
        CatalogItem::Train(t) => {
            text_matches(&filters.search_term, &t.train_name)
                || text_matches(&filters.search_term, &t.train_number)
        }
        CatalogItem::Bus(b) => {
            text_matches(&filters.search_term, &b.bus_name)
                || text_matches(&filters.search_term, &b.route)
        }
        CatalogItem::Flight(f) => {
            text_matches(&filters.search_term, &f.flight_name)
                || text_matches(&filters.search_term, &f.flight_number)
        }
        CatalogItem::Hotel(h) => {
            text_matches(&filters.search_term, &h.name)
                || text_matches(&filters.search_term, &h.location)
        }
    };
    if !search_ok {
        return false;
    }

    let date_ok = filters.date.is_empty()
        || item
            .travel_date()
            .map_or(true, |travel_date| travel_date == filters.date);
    if !date_ok {
        return false;
    }

    if !range_matches(filters.min_price, filters.max_price, item.price()) {
        return false;
    }

    let capacity_ok = match item {
        CatalogItem::Bus(b) => {
            range_matches(filters.min_capacity, filters.max_capacity, b.capacity)
        }
        CatalogItem::Hotel(h) => {
            range_matches(filters.min_capacity, filters.max_capacity, h.capacity)
        }
        _ => true,
    };
    if !capacity_ok {
        return false;
    }

    if filters.category_active() {
        let category_ok = match item {
            CatalogItem::Bus(b) => b.bus_type == filters.category,
            CatalogItem::Flight(f) => f.airline == filters.category,
            // Hotel categories are minimum-rating buckets ("4.5", "4", ...)
            CatalogItem::Hotel(h) => filters
                .category
                .parse::<f64>()
                .map_or(true, |min_rating| h.rating >= min_rating),
            CatalogItem::Train(_) => true,
        };
        if !category_ok {
            return false;
        }
    }

    true
}

/// Apply the filter state to a list. Pure and synchronous; recomputed in full
/// whenever the filters or the source list change.
pub fn apply(items: &[CatalogItem], filters: &FilterState) -> Vec<CatalogItem> {
    items
        .iter()
        .filter(|item| matches(item, filters))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{fallback_buses, fallback_hotels, fallback_trains, sample_flights};
    use test_case::test_case;

    fn mixed_catalog() -> Vec<CatalogItem> {
        let mut items = fallback_trains();
        items.extend(fallback_buses());
        items.extend(sample_flights());
        items.extend(fallback_hotels());
        items
    }

    #[test]
    fn test_default_filter_is_identity() {
        let items = mixed_catalog();
        let filtered = apply(&items, &FilterState::default());
        assert_eq!(filtered, items);
    }

    #[test]
    fn test_all_sentinel_matches_everything() {
        let items = mixed_catalog();
        let filters = FilterState {
            category: "all".to_string(),
            ..Default::default()
        };
        assert_eq!(apply(&items, &filters), items);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = mixed_catalog();
        let filters = FilterState {
            source: "new delhi".to_string(),
            max_price: Some(2500.0),
            ..Default::default()
        };
        let once = apply(&items, &filters);
        let twice = apply(&once, &filters);
        assert_eq!(once, twice);
    }

    // Each content tab filters its own kind's list, so the tables below do too.
    #[test_case(fallback_trains(), FilterState { source: "delhi".to_string(), ..Default::default() },
        vec!["Rajdhani Express", "Shatabdi Express"]; "#1 source substring, case-insensitive")]
    #[test_case(fallback_trains(), FilterState { destination: "mumbai".to_string(), ..Default::default() },
        vec!["Rajdhani Express"]; "#2 destination substring")]
    #[test_case(fallback_trains(), FilterState { search_term: "12301".to_string(), ..Default::default() },
        vec!["Rajdhani Express"]; "#3 search by train number")]
    #[test_case(fallback_trains(), FilterState { min_price: Some(1600.0), ..Default::default() },
        vec!["Rajdhani Express"]; "#4 price floor")]
    #[test_case(fallback_trains(), FilterState { date: "2030-01-01".to_string(), ..Default::default() },
        vec![]; "#5 date mismatch excludes all")]
    #[test_case(fallback_buses(), FilterState { category: "Non-AC".to_string(), min_capacity: Some(30), ..Default::default() },
        vec!["Metro Link 205"]; "#6 bus type with capacity floor")]
    #[test_case(fallback_buses(), FilterState { max_capacity: Some(45), ..Default::default() },
        vec!["Metro Link 205"]; "#7 capacity ceiling")]
    #[test_case(sample_flights(), FilterState { category: "IndiGo".to_string(), ..Default::default() },
        vec!["IndiGo Airways"]; "#8 airline exact match")]
    #[test_case(sample_flights(), FilterState { search_term: "6e321".to_string(), ..Default::default() },
        vec!["IndiGo Airways"]; "#9 search by flight number, case-insensitive")]
    #[test_case(fallback_hotels(), FilterState { category: "4.6".to_string(), ..Default::default() },
        vec!["Grand Plaza Hotel", "Mountain Lodge"]; "#10 hotel rating floor")]
    #[test_case(fallback_hotels(), FilterState { source: "miami".to_string(), ..Default::default() },
        vec!["Seaside Resort"]; "#11 hotel location match")]
    #[test_case(fallback_hotels(), FilterState { max_price: Some(250.0), category: "all".to_string(), ..Default::default() },
        vec!["Grand Plaza Hotel"]; "#12 combined price and sentinel category")]
    fn test_filter_selection(items: Vec<CatalogItem>, filters: FilterState, expected_names: Vec<&str>) {
        let filtered = apply(&items, &filters);
        let names: Vec<&str> = filtered.iter().map(|item| item.display_name()).collect();
        assert_eq!(names, expected_names);
    }

    #[test]
    fn test_date_mismatch_excludes_dated_items() {
        let items = mixed_catalog();
        let filters = FilterState {
            date: "2030-01-01".to_string(),
            ..Default::default()
        };
        let filtered = apply(&items, &filters);
        // Only items without a journey date survive an unmatched date
        assert!(filtered.iter().all(|item| item.travel_date().is_none()));
        assert!(!filtered.is_empty());
    }
}
