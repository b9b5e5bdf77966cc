//! Perishable shipment transport selection.
//!
//! Picks one carrier per shipment leg for goods that lose freshness in
//! transit, trading off cost, transit time and service quality under a named
//! priority profile.
//!
//! # Domain Model
//!
//! - [`Coordinate`](geometry::Coordinate): Geographic point with haversine distance
//! - [`TransportOption`](domain::TransportOption): Carrier with capacity, cost, speed and quality
//! - [`RouteRequest`](domain::RouteRequest): One shipment leg to be assigned a carrier
//! - [`Catalog`](catalog::Catalog): Harvesters, carriers, distributors, wholesalers, retailers
//!
//! # Constraints
//!
//! - **Capacity** (hard): Carrier capacity must cover the quantity
//! - **Cold chain** (hard): Refrigerated carrier when the shipment requires one
//! - **Freshness buffer** (hard): Transit within 70% of the freshness life
//! - **Weighted objective** (soft): Normalized cost, time and quality shortfall

pub mod api;
pub mod catalog;
pub mod config;
pub mod console;
pub mod constraints;
pub mod demo_data;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod scoring;
pub mod simulation;
pub mod solver;
