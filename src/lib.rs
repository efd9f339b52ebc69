#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Contains the domain models, the authentication core (token codec,"]
#![doc = "request middleware, federated-identity reconciliation), the"]
#![doc = "persistence traits with their PostgreSQL and in-memory backends,"]
#![doc = "routing configuration, and error handling. The main binary"]
#![doc = "(`main.rs`) wires these together and runs the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
