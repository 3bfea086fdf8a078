use serde::{Deserialize, Serialize};

use crate::models::PropertyType;

/// Sort keys accepted by the catalog list endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortKey {
    /// Newest listings first (backend default)
    #[default]
    NewestFirst,
    PriceAscending,
    PriceDescending,
    SurfaceAscending,
    SurfaceDescending,
}

impl SortKey {
    /// Query-parameter value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NewestFirst => "-created_at",
            SortKey::PriceAscending => "monthly_rent",
            SortKey::PriceDescending => "-monthly_rent",
            SortKey::SurfaceAscending => "surface",
            SortKey::SurfaceDescending => "-surface",
        }
    }
}

/// Search parameters for the property catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchFilters {
    /// Page number, starting at 1
    pub page: u32,
    /// Server-side ordering; the client never re-sorts results
    pub ordering: SortKey,
    /// Free-text search over title, description and address
    pub search: String,
    /// Restrict to one kind of unit
    pub property_type: Option<PropertyType>,
    /// City filter (substring match server-side)
    pub city: Option<String>,
    /// Minimum monthly rent
    pub min_price: Option<i64>,
    /// Maximum monthly rent
    pub max_price: Option<i64>,
    /// Only furnished / unfurnished units
    pub furnished: Option<bool>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            page: 1,
            ordering: SortKey::default(),
            search: String::new(),
            property_type: None,
            city: None,
            min_price: None,
            max_price: None,
            furnished: None,
        }
    }
}

/// A single filter-field change.
/// Fields are an enum rather than stringly-typed keys so an unrecognized
/// field cannot exist at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    Search(String),
    Ordering(SortKey),
    PropertyType(Option<PropertyType>),
    City(Option<String>),
    MinPrice(Option<i64>),
    MaxPrice(Option<i64>),
    Furnished(Option<bool>),
}

impl SearchFilters {
    /// Apply one field change. Any change invalidates the pagination
    /// position, so the page always snaps back to 1.
    pub fn apply(&mut self, update: FilterUpdate) {
        match update {
            FilterUpdate::Search(s) => self.search = s,
            FilterUpdate::Ordering(o) => self.ordering = o,
            FilterUpdate::PropertyType(t) => self.property_type = t,
            FilterUpdate::City(c) => self.city = c,
            FilterUpdate::MinPrice(p) => self.min_price = p,
            FilterUpdate::MaxPrice(p) => self.max_price = p,
            FilterUpdate::Furnished(f) => self.furnished = f,
        }
        self.page = 1;
    }

    /// Serialize as query pairs. Empty and absent fields are omitted
    /// entirely, never sent as `key=`.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("ordering".to_string(), self.ordering.as_str().to_string()),
        ];
        if !self.search.is_empty() {
            query.push(("search".to_string(), self.search.clone()));
        }
        if let Some(t) = self.property_type {
            query.push(("type".to_string(), t.as_str().to_string()));
        }
        if let Some(city) = &self.city {
            if !city.is_empty() {
                query.push(("city".to_string(), city.clone()));
            }
        }
        if let Some(min) = self.min_price {
            query.push(("min_price".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            query.push(("max_price".to_string(), max.to_string()));
        }
        if let Some(furnished) = self.furnished {
            query.push(("furnished".to_string(), furnished.to_string()));
        }
        query
    }
}
