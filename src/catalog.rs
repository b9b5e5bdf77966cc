//! Supply-chain participant catalog.
//!
//! The catalog resolves `(entity type, id)` pairs to coordinates and holds
//! the transporter candidate set. It is plain data passed into the optimizer;
//! the shared copy lives in a [`CatalogStore`] that is only ever replaced
//! wholesale, never mutated in place.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::domain::{RouteRequest, TransportOption};
use crate::error::RoutingError;
use crate::geometry::Coordinate;

/// Role of a participant in the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Harvester,
    Transporter,
    Distributor,
    Wholesaler,
    Retailer,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Harvester => "harvester",
            EntityType::Transporter => "transporter",
            EntityType::Distributor => "distributor",
            EntityType::Wholesaler => "wholesaler",
            EntityType::Retailer => "retailer",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = RoutingError;

    /// ```
    /// use perishable_routing::catalog::EntityType;
    ///
    /// assert_eq!("retailer".parse::<EntityType>().unwrap(), EntityType::Retailer);
    /// assert!("florist".parse::<EntityType>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "harvester" => Ok(EntityType::Harvester),
            "transporter" => Ok(EntityType::Transporter),
            "distributor" => Ok(EntityType::Distributor),
            "wholesaler" => Ok(EntityType::Wholesaler),
            "retailer" => Ok(EntityType::Retailer),
            other => Err(RoutingError::UnknownEntityType(other.to_string())),
        }
    }
}

/// A fixed-location participant: farm, hub, market or shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Site {
    pub id: u32,
    pub name: String,
    /// Human-readable place name.
    pub location: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
    pub quality: f64,
    pub cost_per_unit: f64,
    /// Whether the site has refrigerated storage. Not tracked for harvesters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cold_storage: Option<bool>,
}

impl Site {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Reference to a participant by role and numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntityRef {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub id: u32,
}

impl EntityRef {
    pub fn new(entity_type: EntityType, id: u32) -> Self {
        Self { entity_type, id }
    }
}

/// All known participants grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Catalog {
    pub harvesters: Vec<Site>,
    pub transporters: Vec<TransportOption>,
    pub distributors: Vec<Site>,
    pub wholesalers: Vec<Site>,
    pub retailers: Vec<Site>,
}

impl Catalog {
    fn sites(&self, entity_type: EntityType) -> Result<&[Site], RoutingError> {
        match entity_type {
            EntityType::Harvester => Ok(&self.harvesters),
            EntityType::Distributor => Ok(&self.distributors),
            EntityType::Wholesaler => Ok(&self.wholesalers),
            EntityType::Retailer => Ok(&self.retailers),
            EntityType::Transporter => Err(RoutingError::UnlocatedEntityType(entity_type)),
        }
    }

    /// Looks up a fixed-location participant.
    pub fn site(&self, entity: EntityRef) -> Result<&Site, RoutingError> {
        self.sites(entity.entity_type)?
            .iter()
            .find(|s| s.id == entity.id)
            .ok_or(RoutingError::UnknownEntity {
                entity_type: entity.entity_type,
                id: entity.id,
            })
    }

    /// Coordinates of a participant.
    ///
    /// # Examples
    ///
    /// ```
    /// use perishable_routing::catalog::{EntityRef, EntityType};
    /// use perishable_routing::demo_data::reference_catalog;
    ///
    /// let catalog = reference_catalog();
    /// let pune = catalog.coordinate(EntityRef::new(EntityType::Harvester, 1)).unwrap();
    /// assert_eq!(pune.latitude, 18.5204);
    ///
    /// assert!(catalog.coordinate(EntityRef::new(EntityType::Retailer, 99)).is_err());
    /// ```
    pub fn coordinate(&self, entity: EntityRef) -> Result<Coordinate, RoutingError> {
        self.site(entity).map(Site::coordinate)
    }

    /// Builds a balanced, non-refrigerated route request between two participants.
    ///
    /// Quantity arrives as a signed wire value and is rejected unless positive.
    pub fn route_request(
        &self,
        source: EntityRef,
        destination: EntityRef,
        quantity: i64,
        freshness_life_hours: f64,
    ) -> Result<RouteRequest, RoutingError> {
        let source = self.coordinate(source)?;
        let destination = self.coordinate(destination)?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(RoutingError::InvalidQuantity(quantity))?;
        let request = RouteRequest::new(source, destination, quantity, freshness_life_hours);
        request.validate()?;
        Ok(request)
    }

    /// Returns a copy with the transporter set replaced.
    pub fn with_transporters(&self, transporters: Vec<TransportOption>) -> Self {
        Self {
            transporters,
            ..self.clone()
        }
    }
}

/// Shared, swappable catalog snapshot.
///
/// Readers take an `Arc` snapshot and keep it for the whole call; a
/// replacement only affects calls that start afterwards.
///
/// # Examples
///
/// ```
/// use perishable_routing::catalog::CatalogStore;
/// use perishable_routing::demo_data::reference_catalog;
///
/// let store = CatalogStore::new(reference_catalog());
/// let before = store.snapshot();
///
/// store.replace_transporters(vec![before.transporters[2].clone()]).unwrap();
///
/// assert_eq!(before.transporters.len(), 3);
/// assert_eq!(store.snapshot().transporters.len(), 1);
/// ```
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The catalog as of now.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.read().clone()
    }

    /// Swaps in a new catalog.
    pub fn replace(&self, catalog: Catalog) {
        *self.current.write() = Arc::new(catalog);
    }

    /// Swaps in a catalog with a new transporter set, after validating it.
    pub fn replace_transporters(&self, transporters: Vec<TransportOption>) -> Result<(), RoutingError> {
        if transporters.is_empty() {
            return Err(RoutingError::NoCandidates);
        }
        for option in &transporters {
            option.validate()?;
        }
        let mut guard = self.current.write();
        *guard = Arc::new(guard.with_transporters(transporters));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo_data::reference_catalog;

    #[test]
    fn test_entity_type_round_trip() {
        for t in [
            EntityType::Harvester,
            EntityType::Transporter,
            EntityType::Distributor,
            EntityType::Wholesaler,
            EntityType::Retailer,
        ] {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
        assert!(matches!(
            "Harvester".parse::<EntityType>(),
            Err(RoutingError::UnknownEntityType(_))
        ));
    }

    #[test]
    fn test_transporters_have_no_location() {
        let catalog = reference_catalog();
        assert!(matches!(
            catalog.coordinate(EntityRef::new(EntityType::Transporter, 1)),
            Err(RoutingError::UnlocatedEntityType(EntityType::Transporter))
        ));
    }

    #[test]
    fn test_route_request_validation() {
        let catalog = reference_catalog();
        let farm = EntityRef::new(EntityType::Harvester, 1);
        let shop = EntityRef::new(EntityType::Retailer, 1);

        let request = catalog.route_request(farm, shop, 500, 72.0).unwrap();
        assert_eq!(request.quantity, 500);
        assert_eq!(request.source, Coordinate::new(18.5204, 73.8567));

        assert!(matches!(
            catalog.route_request(farm, shop, 0, 72.0),
            Err(RoutingError::InvalidQuantity(0))
        ));
        assert!(matches!(
            catalog.route_request(farm, shop, -3, 72.0),
            Err(RoutingError::InvalidQuantity(-3))
        ));
        assert!(matches!(
            catalog.route_request(farm, shop, 10, -1.0),
            Err(RoutingError::InvalidFreshnessLife(_))
        ));
        assert!(matches!(
            catalog.route_request(farm, EntityRef::new(EntityType::Wholesaler, 7), 10, 72.0),
            Err(RoutingError::UnknownEntity { id: 7, .. })
        ));
    }

    #[test]
    fn test_store_swap_keeps_old_snapshots_intact() {
        let store = CatalogStore::new(reference_catalog());
        let held = store.snapshot();

        store.replace(Catalog::default());

        assert_eq!(held.harvesters.len(), 3);
        assert!(store.snapshot().harvesters.is_empty());
    }

    #[test]
    fn test_store_rejects_invalid_transporters() {
        let store = CatalogStore::new(reference_catalog());
        assert!(store.replace_transporters(Vec::new()).is_err());

        let broken = TransportOption::new(9, "Broken", "Cart");
        assert!(store.replace_transporters(vec![broken]).is_err());
        assert_eq!(store.snapshot().transporters.len(), 3);
    }
}
