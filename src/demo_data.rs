//! Reference catalog for a cut-flower supply chain in western and northern India.
//!
//! - 3 harvesters (Pune, Nashik, Bangalore)
//! - 3 transporters (refrigerated truck, plain van, climate-controlled van)
//! - 2 distributors, 2 wholesalers (Mumbai, Delhi)
//! - 3 retailers (Mumbai, Delhi, Bangalore)
//!
//! Transporter route multipliers (0.95, 1.00, 1.05) model the carriers taking
//! measurably different roads between the same two points.

use crate::catalog::{Catalog, EntityRef, EntityType, Site};
use crate::domain::{Priority, TransportOption};

/// Site row used to build the catalog tables.
struct SiteData {
    id: u32,
    name: &'static str,
    location: &'static str,
    lat: f64,
    lon: f64,
    capacity: u32,
    quality: f64,
    cost_per_unit: f64,
    cold_storage: Option<bool>,
}

impl SiteData {
    fn to_site(&self) -> Site {
        Site {
            id: self.id,
            name: self.name.to_string(),
            location: self.location.to_string(),
            lat: self.lat,
            lon: self.lon,
            capacity: self.capacity,
            quality: self.quality,
            cost_per_unit: self.cost_per_unit,
            cold_storage: self.cold_storage,
        }
    }
}

const HARVESTERS: &[SiteData] = &[
    SiteData { id: 1, name: "Green Valley Farms", location: "Pune", lat: 18.5204, lon: 73.8567, capacity: 5000, quality: 0.95, cost_per_unit: 10.0, cold_storage: None },
    SiteData { id: 2, name: "Sunrise Flowers", location: "Nashik", lat: 19.9975, lon: 73.7898, capacity: 8000, quality: 0.92, cost_per_unit: 8.0, cold_storage: None },
    SiteData { id: 3, name: "Blossom Gardens", location: "Bangalore", lat: 12.9716, lon: 77.5946, capacity: 6000, quality: 0.98, cost_per_unit: 12.0, cold_storage: None },
];

const DISTRIBUTORS: &[SiteData] = &[
    SiteData { id: 1, name: "Metro Flower Hub", location: "Mumbai", lat: 19.0760, lon: 72.8777, capacity: 10000, quality: 0.90, cost_per_unit: 5.0, cold_storage: Some(true) },
    SiteData { id: 2, name: "Central Florals Dist", location: "Delhi", lat: 28.7041, lon: 77.1025, capacity: 15000, quality: 0.88, cost_per_unit: 4.0, cold_storage: Some(true) },
];

const WHOLESALERS: &[SiteData] = &[
    SiteData { id: 1, name: "Dadar Flower Market", location: "Mumbai", lat: 19.0178, lon: 72.8478, capacity: 20000, quality: 0.85, cost_per_unit: 3.0, cold_storage: Some(false) },
    SiteData { id: 2, name: "Ghazipur Mandi", location: "Delhi", lat: 28.6253, lon: 77.3212, capacity: 25000, quality: 0.82, cost_per_unit: 2.0, cold_storage: Some(false) },
];

const RETAILERS: &[SiteData] = &[
    SiteData { id: 1, name: "Rose Garden Florist", location: "Bandra, Mumbai", lat: 19.0596, lon: 72.8295, capacity: 500, quality: 0.95, cost_per_unit: 8.0, cold_storage: Some(true) },
    SiteData { id: 2, name: "Bloom & Petals", location: "Connaught Place, Delhi", lat: 28.6315, lon: 77.2167, capacity: 400, quality: 0.93, cost_per_unit: 10.0, cold_storage: Some(true) },
    SiteData { id: 3, name: "Fresh Flowers Hub", location: "Koramangala, Bangalore", lat: 12.9352, lon: 77.6245, capacity: 600, quality: 0.88, cost_per_unit: 6.0, cold_storage: Some(false) },
];

/// The three reference carriers.
///
/// ```
/// use perishable_routing::demo_data::reference_transporters;
///
/// let carriers = reference_transporters();
/// assert_eq!(carriers.len(), 3);
/// assert!(carriers[0].cold_chain && !carriers[1].cold_chain && carriers[2].cold_chain);
/// ```
pub fn reference_transporters() -> Vec<TransportOption> {
    vec![
        TransportOption::new(1, "ColdChain Express", "Refrigerated Truck")
            .with_cold_chain(true)
            .with_capacity(2000)
            .with_cost_per_km(15.0)
            .with_speed_kmph(50.0)
            .with_quality(0.95)
            .with_route_multiplier(0.95),
        TransportOption::new(2, "FastFlora Logistics", "Van")
            .with_cold_chain(false)
            .with_capacity(1000)
            .with_cost_per_km(8.0)
            .with_speed_kmph(60.0)
            .with_quality(0.80)
            .with_route_multiplier(1.0),
        TransportOption::new(3, "Premium Florals Transport", "Climate-Controlled Van")
            .with_cold_chain(true)
            .with_capacity(1500)
            .with_cost_per_km(12.0)
            .with_speed_kmph(55.0)
            .with_quality(0.92)
            .with_route_multiplier(1.05),
    ]
}

fn sites(rows: &[SiteData]) -> Vec<Site> {
    rows.iter().map(SiteData::to_site).collect()
}

/// Builds the full reference catalog.
///
/// # Examples
///
/// ```
/// use perishable_routing::demo_data::reference_catalog;
///
/// let catalog = reference_catalog();
/// assert_eq!(catalog.harvesters.len(), 3);
/// assert_eq!(catalog.transporters.len(), 3);
/// assert_eq!(catalog.distributors.len(), 2);
/// assert_eq!(catalog.wholesalers.len(), 2);
/// assert_eq!(catalog.retailers.len(), 3);
/// ```
pub fn reference_catalog() -> Catalog {
    Catalog {
        harvesters: sites(HARVESTERS),
        transporters: reference_transporters(),
        distributors: sites(DISTRIBUTORS),
        wholesalers: sites(WHOLESALERS),
        retailers: sites(RETAILERS),
    }
}

/// Parameters of the canned demo shipment.
#[derive(Debug, Clone, Copy)]
pub struct DemoShipment {
    pub source: EntityRef,
    pub destination: EntityRef,
    pub quantity: i64,
    pub freshness_life_hours: f64,
    pub priority: Priority,
    pub require_cold_chain: bool,
}

/// Pune farm to Bandra florist: 500 units, 72h life, refrigerated.
pub fn demo_shipment() -> DemoShipment {
    DemoShipment {
        source: EntityRef::new(EntityType::Harvester, 1),
        destination: EntityRef::new(EntityType::Retailer, 1),
        quantity: 500,
        freshness_life_hours: 72.0,
        priority: Priority::Balanced,
        require_cold_chain: true,
    }
}
