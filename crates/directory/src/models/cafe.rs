//! Café domain types.

use cafe_and_wifi_core::{CafeId, CoffeePrice, Location, SeatRange, UserId};

/// A directory entry (domain type).
#[derive(Debug, Clone)]
pub struct Cafe {
    pub id: CafeId,
    /// Unique display name.
    pub name: String,
    /// Map link or street address, fed to the geocoder.
    pub map_url: String,
    /// Public URL of the uploaded photo.
    pub img_url: String,
    pub location: Location,
    pub has_sockets: bool,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub can_take_calls: bool,
    pub seats: SeatRange,
    pub coffee_price: CoffeePrice,
    pub description: String,
    pub opening_time: Option<String>,
    pub likes: i64,
    /// User who added the café.
    pub author_id: UserId,
}

/// Everything needed to insert a café.
///
/// Built by the add-café handler once the form is valid and the image is hosted.
#[derive(Debug, Clone)]
pub struct NewCafe {
    pub name: String,
    pub map_url: String,
    pub img_url: url::Url,
    pub location: Location,
    pub has_sockets: bool,
    pub has_toilet: bool,
    pub has_wifi: bool,
    pub can_take_calls: bool,
    pub seats: SeatRange,
    pub coffee_price: CoffeePrice,
    pub description: String,
    pub opening_time: Option<String>,
    pub author_id: UserId,
}
