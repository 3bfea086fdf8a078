use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

/// Kind of rentable unit
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropertyType {
    #[serde(rename = "APARTMENT")]
    Apartment,
    #[serde(rename = "HOUSE")]
    House,
    #[serde(rename = "STUDIO")]
    Studio,
    #[serde(rename = "ROOM")]
    Room,
}

impl PropertyType {
    /// Query-parameter value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "APARTMENT",
            PropertyType::House => "HOUSE",
            PropertyType::Studio => "STUDIO",
            PropertyType::Room => "ROOM",
        }
    }
}

/// Postal address attached to a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub street_address: String,
    pub city: String,
    pub postal_code: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub full_address: String,
}

/// Listing photo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub url: String,
    pub thumbnail_url: String,
    pub is_primary: bool,
}

/// A rentable unit as returned by the catalog list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    /// Decimal serialized as a string, e.g. "450000.00"
    pub monthly_rent: String,
    pub surface: f64,
    pub number_of_rooms: u32,
    pub number_of_bedrooms: u32,
    pub address: Address,
    pub primary_photo: Option<Photo>,
    pub furnished: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Listing {
    /// Parse the decimal rent string into a number, if well formed
    pub fn monthly_rent_value(&self) -> Option<f64> {
        self.monthly_rent.parse().ok()
    }
}

/// One page of catalog results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Listing>,
}

impl ListingPage {
    /// Parse a raw response body, mapping shape mismatches to a typed error
    pub fn from_value(value: serde_json::Value) -> ApiResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| ApiError::MalformedResponse(format!("listing page: {}", e)))
    }
}

/// One saved favorite, wrapping the listing it points at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: i64,
    pub property: Listing,
    pub created_at: DateTime<Utc>,
}

/// The authenticated user's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
}

/// A message between a renter and a landlord about a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    /// Listing the conversation is about
    pub property: i64,
    #[serde(default)]
    pub property_detail: Option<Listing>,
    pub sender: UserProfile,
    pub recipient: UserProfile,
    pub subject: String,
    pub content: String,
    pub is_read: bool,
    pub sent_at: DateTime<Utc>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
}
