//! # clinigate-core
//!
//! Core types for the Clinigate multi-tenant clinical-record store.
//!
//! This crate defines the data model shared by the authorization engine and
//! its collaborators:
//!
//! - [`fhir`] - FHIR resource type enumeration
//! - [`partition`] - tenant partition names and their classes
//! - [`resource`] - the opaque resource record envelope and its accessors
//! - [`error`] - core error types

pub mod error;
pub mod fhir;
pub mod partition;
pub mod resource;

pub use error::{CoreError, Result};
pub use fhir::ResourceType;
pub use partition::{
    DEFAULT_PARTITION, DOCTOR_PARTITION_MARKER, Partition, PartitionClass, ROOT_PARTITION,
    parse_doctor_key,
};
pub use resource::ResourceRecord;
