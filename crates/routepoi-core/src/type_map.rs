//! Static category tables: provider category → canonical type → external type id.
//!
//! All lookups are case-insensitive and total. Anything unmapped resolves to
//! [`CanonicalType::Generic`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CanonicalType {
    #[default]
    Generic,
    Food,
    Coffee,
    Bar,
    Grocery,
    ConvenienceStore,
    Lodging,
    Camping,
    Water,
    Restroom,
    Fuel,
    BikeShop,
    BikeParking,
    Parking,
    Shopping,
    Viewpoint,
    Park,
    Attraction,
    Museum,
    Hospital,
    Pharmacy,
    Atm,
    Library,
    TransitStation,
    Shelter,
}

impl CanonicalType {
    pub const ALL: [CanonicalType; 25] = [
        CanonicalType::Generic,
        CanonicalType::Food,
        CanonicalType::Coffee,
        CanonicalType::Bar,
        CanonicalType::Grocery,
        CanonicalType::ConvenienceStore,
        CanonicalType::Lodging,
        CanonicalType::Camping,
        CanonicalType::Water,
        CanonicalType::Restroom,
        CanonicalType::Fuel,
        CanonicalType::BikeShop,
        CanonicalType::BikeParking,
        CanonicalType::Parking,
        CanonicalType::Shopping,
        CanonicalType::Viewpoint,
        CanonicalType::Park,
        CanonicalType::Attraction,
        CanonicalType::Museum,
        CanonicalType::Hospital,
        CanonicalType::Pharmacy,
        CanonicalType::Atm,
        CanonicalType::Library,
        CanonicalType::TransitStation,
        CanonicalType::Shelter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalType::Generic => "generic",
            CanonicalType::Food => "food",
            CanonicalType::Coffee => "coffee",
            CanonicalType::Bar => "bar",
            CanonicalType::Grocery => "grocery",
            CanonicalType::ConvenienceStore => "convenience_store",
            CanonicalType::Lodging => "lodging",
            CanonicalType::Camping => "camping",
            CanonicalType::Water => "water",
            CanonicalType::Restroom => "restroom",
            CanonicalType::Fuel => "fuel",
            CanonicalType::BikeShop => "bike_shop",
            CanonicalType::BikeParking => "bike_parking",
            CanonicalType::Parking => "parking",
            CanonicalType::Shopping => "shopping",
            CanonicalType::Viewpoint => "viewpoint",
            CanonicalType::Park => "park",
            CanonicalType::Attraction => "attraction",
            CanonicalType::Museum => "museum",
            CanonicalType::Hospital => "hospital",
            CanonicalType::Pharmacy => "pharmacy",
            CanonicalType::Atm => "atm",
            CanonicalType::Library => "library",
            CanonicalType::TransitStation => "transit_station",
            CanonicalType::Shelter => "shelter",
        }
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalType {
    type Err = Infallible;

    /// Never fails: unknown names become `Generic`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Ok(CanonicalType::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .unwrap_or_default())
    }
}

impl From<String> for CanonicalType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<CanonicalType> for String {
    fn from(value: CanonicalType) -> Self {
        value.as_str().to_string()
    }
}

const GOOGLE_TYPES: &[(&str, CanonicalType)] = &[
    ("restaurant", CanonicalType::Food),
    ("fast_food_restaurant", CanonicalType::Food),
    ("pizza_restaurant", CanonicalType::Food),
    ("hamburger_restaurant", CanonicalType::Food),
    ("sandwich_shop", CanonicalType::Food),
    ("meal_takeaway", CanonicalType::Food),
    ("bakery", CanonicalType::Food),
    ("ice_cream_shop", CanonicalType::Food),
    ("cafe", CanonicalType::Coffee),
    ("coffee_shop", CanonicalType::Coffee),
    ("bar", CanonicalType::Bar),
    ("pub", CanonicalType::Bar),
    ("wine_bar", CanonicalType::Bar),
    ("night_club", CanonicalType::Bar),
    ("supermarket", CanonicalType::Grocery),
    ("grocery_store", CanonicalType::Grocery),
    ("market", CanonicalType::Grocery),
    ("convenience_store", CanonicalType::ConvenienceStore),
    ("lodging", CanonicalType::Lodging),
    ("hotel", CanonicalType::Lodging),
    ("motel", CanonicalType::Lodging),
    ("hostel", CanonicalType::Lodging),
    ("bed_and_breakfast", CanonicalType::Lodging),
    ("guest_house", CanonicalType::Lodging),
    ("campground", CanonicalType::Camping),
    ("camping_cabin", CanonicalType::Camping),
    ("rv_park", CanonicalType::Camping),
    ("gas_station", CanonicalType::Fuel),
    ("bicycle_store", CanonicalType::BikeShop),
    ("parking", CanonicalType::Parking),
    ("shopping_mall", CanonicalType::Shopping),
    ("department_store", CanonicalType::Shopping),
    ("clothing_store", CanonicalType::Shopping),
    ("store", CanonicalType::Shopping),
    ("observation_deck", CanonicalType::Viewpoint),
    ("park", CanonicalType::Park),
    ("national_park", CanonicalType::Park),
    ("state_park", CanonicalType::Park),
    ("hiking_area", CanonicalType::Park),
    ("tourist_attraction", CanonicalType::Attraction),
    ("historical_landmark", CanonicalType::Attraction),
    ("museum", CanonicalType::Museum),
    ("art_gallery", CanonicalType::Museum),
    ("hospital", CanonicalType::Hospital),
    ("pharmacy", CanonicalType::Pharmacy),
    ("drugstore", CanonicalType::Pharmacy),
    ("atm", CanonicalType::Atm),
    ("bank", CanonicalType::Atm),
    ("library", CanonicalType::Library),
    ("train_station", CanonicalType::TransitStation),
    ("bus_station", CanonicalType::TransitStation),
    ("subway_station", CanonicalType::TransitStation),
    ("transit_station", CanonicalType::TransitStation),
    ("public_bathroom", CanonicalType::Restroom),
];

const OSM_TAGS: &[(&str, CanonicalType)] = &[
    ("amenity=restaurant", CanonicalType::Food),
    ("amenity=fast_food", CanonicalType::Food),
    ("amenity=food_court", CanonicalType::Food),
    ("amenity=ice_cream", CanonicalType::Food),
    ("amenity=cafe", CanonicalType::Coffee),
    ("amenity=bar", CanonicalType::Bar),
    ("amenity=pub", CanonicalType::Bar),
    ("amenity=biergarten", CanonicalType::Bar),
    ("amenity=marketplace", CanonicalType::Grocery),
    ("amenity=drinking_water", CanonicalType::Water),
    ("amenity=water_point", CanonicalType::Water),
    ("amenity=toilets", CanonicalType::Restroom),
    ("amenity=fuel", CanonicalType::Fuel),
    ("amenity=bicycle_repair_station", CanonicalType::BikeShop),
    ("amenity=bicycle_parking", CanonicalType::BikeParking),
    ("amenity=parking", CanonicalType::Parking),
    ("amenity=shelter", CanonicalType::Shelter),
    ("amenity=hospital", CanonicalType::Hospital),
    ("amenity=clinic", CanonicalType::Hospital),
    ("amenity=pharmacy", CanonicalType::Pharmacy),
    ("amenity=atm", CanonicalType::Atm),
    ("amenity=bank", CanonicalType::Atm),
    ("amenity=library", CanonicalType::Library),
    ("amenity=bus_station", CanonicalType::TransitStation),
    ("shop=bicycle", CanonicalType::BikeShop),
    ("shop=supermarket", CanonicalType::Grocery),
    ("shop=convenience", CanonicalType::ConvenienceStore),
    ("shop=bakery", CanonicalType::Food),
    ("shop=mall", CanonicalType::Shopping),
    ("tourism=hotel", CanonicalType::Lodging),
    ("tourism=motel", CanonicalType::Lodging),
    ("tourism=hostel", CanonicalType::Lodging),
    ("tourism=guest_house", CanonicalType::Lodging),
    ("tourism=camp_site", CanonicalType::Camping),
    ("tourism=caravan_site", CanonicalType::Camping),
    ("tourism=viewpoint", CanonicalType::Viewpoint),
    ("tourism=museum", CanonicalType::Museum),
    ("tourism=attraction", CanonicalType::Attraction),
    ("leisure=park", CanonicalType::Park),
    ("railway=station", CanonicalType::TransitStation),
];

const EXTERNAL_IDS: &[(CanonicalType, i64)] = &[
    (CanonicalType::Generic, 0),
    (CanonicalType::Food, 1),
    (CanonicalType::Coffee, 2),
    (CanonicalType::Bar, 3),
    (CanonicalType::Grocery, 4),
    (CanonicalType::ConvenienceStore, 5),
    (CanonicalType::Lodging, 6),
    (CanonicalType::Camping, 7),
    (CanonicalType::Water, 8),
    (CanonicalType::Restroom, 9),
    (CanonicalType::Fuel, 10),
    (CanonicalType::BikeShop, 11),
    (CanonicalType::BikeParking, 12),
    (CanonicalType::Parking, 13),
    (CanonicalType::Shopping, 14),
    (CanonicalType::Viewpoint, 15),
    (CanonicalType::Park, 16),
    (CanonicalType::Attraction, 17),
    (CanonicalType::Museum, 18),
    (CanonicalType::Hospital, 19),
    (CanonicalType::Pharmacy, 20),
    (CanonicalType::Atm, 21),
    (CanonicalType::Library, 22),
    (CanonicalType::TransitStation, 23),
    (CanonicalType::Shelter, 24),
];

struct Tables {
    google: HashMap<&'static str, CanonicalType>,
    osm: HashMap<&'static str, CanonicalType>,
    external_ids: HashMap<CanonicalType, i64>,
    by_external_id: HashMap<i64, CanonicalType>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| Tables {
        google: GOOGLE_TYPES.iter().copied().collect(),
        osm: OSM_TAGS.iter().copied().collect(),
        external_ids: EXTERNAL_IDS.iter().copied().collect(),
        by_external_id: EXTERNAL_IDS.iter().map(|&(t, id)| (id, t)).collect(),
    })
}

/// Google Places primary type → canonical type.
pub fn map_google_type(primary_type: &str) -> CanonicalType {
    let key = primary_type.trim().to_ascii_lowercase();
    tables().google.get(key.as_str()).copied().unwrap_or_default()
}

/// OSM `key=value` tag → canonical type. A bare value is read as an `amenity` tag.
pub fn map_osm_tag(tag: &str) -> CanonicalType {
    let key = tag.trim().to_ascii_lowercase();
    let key = if key.contains('=') {
        key
    } else {
        format!("amenity={}", key)
    };
    tables().osm.get(key.as_str()).copied().unwrap_or_default()
}

/// Numeric type id written to the remote route store.
pub fn canonical_type_to_external_id(poi_type: CanonicalType) -> i64 {
    let ids = &tables().external_ids;
    ids.get(&poi_type)
        .or_else(|| ids.get(&CanonicalType::Generic))
        .copied()
        .unwrap_or(0)
}

pub fn external_id_to_canonical(id: i64) -> CanonicalType {
    tables().by_external_id.get(&id).copied().unwrap_or_default()
}

/// `typeName` written alongside the external id.
pub fn canonical_type_name(poi_type: CanonicalType) -> &'static str {
    poi_type.as_str()
}
