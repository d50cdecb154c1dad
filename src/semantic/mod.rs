//! Semantic analysis for service descriptions
//!
//! This module provides:
//! - Identifier derivation for generated C symbols
//! - UUID assembly from the shared base
//! - Attribute table layout calculation
//! - Name validation and error reporting

pub mod analyzer;
pub mod layout;
pub mod naming;
pub mod uuid;

pub use analyzer::{AnalyzedField, AnalyzedService, ServiceAnalyzer};
pub use layout::{AttributeLayout, AttributeLayoutTracker, FieldSlots};
pub use naming::{FieldIdents, ServiceIdents};
pub use uuid::{BaseUuid, Uuid128};
