// Catalog API resource types
// Field layout follows the upstream catalog responses; all scalar values
// arrive as strings ("unknown", "n/a" included)

use serde::{Deserialize, Serialize};

/// A paginated list response from the catalog API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items available
    pub count: u64,
    /// Absolute URL of the next page, if any
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A character from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub gender: String,
    pub birth_year: String,
    /// Absolute URL of the character's homeworld resource
    pub homeworld: String,
    pub eye_color: String,
    pub hair_color: String,
    pub skin_color: String,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    pub url: String,
    pub created: String,
    pub edited: String,
}

/// A planet from the catalog; also used for homeworld lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    pub diameter: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub gravity: String,
    pub population: String,
    pub climate: String,
    pub terrain: String,
    pub surface_water: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    pub url: String,
    pub created: String,
    pub edited: String,
}

/// A species from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub classification: String,
    pub designation: String,
    pub average_height: String,
    pub average_lifespan: String,
    pub eye_colors: String,
    pub hair_colors: String,
    pub skin_colors: String,
    pub language: String,
    /// Some species have no recorded homeworld
    pub homeworld: Option<String>,
    #[serde(default)]
    pub people: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    pub url: String,
    pub created: String,
    pub edited: String,
}

/// A starship from the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Starship {
    pub name: String,
    pub model: String,
    pub starship_class: String,
    pub manufacturer: String,
    pub cost_in_credits: String,
    pub length: String,
    pub crew: String,
    pub passengers: String,
    pub max_atmosphering_speed: String,
    pub hyperdrive_rating: String,
    #[serde(rename = "MGLT")]
    pub mglt: String,
    pub cargo_capacity: String,
    pub consumables: Option<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub pilots: Vec<String>,
    pub url: String,
    pub created: String,
    pub edited: String,
}

/// A character entry from the image lookup API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabankCharacter {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub description: String,
    /// URL of the character's portrait image
    pub image: String,
}
