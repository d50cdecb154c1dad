//! Semantic analyzer for service descriptions

use std::collections::HashMap;

use log::debug;

use super::layout::{AttributeLayout, AttributeLayoutTracker, FieldSlots};
use super::naming::{is_c_identifier, FieldIdents, ServiceIdents};
use super::uuid::{BaseUuid, Uuid128};
use crate::error::SpecError;
use crate::model::{FieldSpec, ServiceSpec};

/// Analyzed service with everything the generators need
#[derive(Debug, Clone)]
pub struct AnalyzedService {
    /// Input description
    pub spec: ServiceSpec,
    /// Output file stem
    pub file_stem: String,
    pub idents: ServiceIdents,
    pub uuid: Uuid128,
    /// Fields in declaration order
    pub fields: Vec<AnalyzedField>,
    pub layout: AttributeLayout,
}

impl AnalyzedService {
    /// Value attribute index of a notifiable/indicatable field
    pub fn value_slot(&self, field: &AnalyzedField) -> Option<usize> {
        self.layout.value_slot(&field.idents.name.lower)
    }

    /// Fields that register at least one application callback
    pub fn callback_fields(&self) -> impl Iterator<Item = &AnalyzedField> {
        self.fields
            .iter()
            .filter(|f| !f.spec.capabilities.callback_ops().is_empty())
    }
}

/// Analyzed characteristic
#[derive(Debug, Clone)]
pub struct AnalyzedField {
    pub spec: FieldSpec,
    pub idents: FieldIdents,
    pub uuid: Uuid128,
    pub slots: FieldSlots,
}

/// Semantic analyzer
#[derive(Debug, Default)]
pub struct ServiceAnalyzer;

impl ServiceAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze one service
    pub fn analyze(&self, spec: &ServiceSpec) -> Result<AnalyzedService, SpecError> {
        debug!("analyzing service {}", spec.name);

        let base = BaseUuid::parse(&spec.base_uuid).ok_or_else(|| SpecError::MalformedBaseUuid {
            service: spec.name.clone(),
            found: spec.base_uuid.clone(),
        })?;

        self.check_names(spec)?;

        let file_stem = spec.file_stem();
        let idents = ServiceIdents::derive(&spec.name, &file_stem);
        let uuid = base.with_first_segment(&spec.uuid);
        let field_idents: Vec<FieldIdents> = spec
            .fields
            .iter()
            .map(|field| FieldIdents::derive(&idents, &field.name))
            .collect();

        self.check_identifiers(spec, &idents, &field_idents)?;

        let mut tracker = AttributeLayoutTracker::new();
        let mut fields = Vec::with_capacity(spec.fields.len());

        for (field, field_idents) in spec.fields.iter().zip(field_idents) {
            let slots = tracker.push(&field_idents.name.lower, field);
            debug!(
                "  field {}: declaration {}, value {}, ccc {:?}",
                field.name, slots.declaration, slots.value, slots.ccc
            );

            fields.push(AnalyzedField {
                spec: field.clone(),
                uuid: base.with_first_segment(&field.uuid),
                idents: field_idents,
                slots,
            });
        }

        let layout = tracker.finish();
        debug!(
            "  {} attributes, {} addressable values",
            layout.attribute_count(),
            layout.value_slots.len()
        );

        Ok(AnalyzedService {
            spec: spec.clone(),
            file_stem,
            idents,
            uuid,
            fields,
            layout,
        })
    }

    /// Reject names that are not C identifiers or that collide once
    /// case-folded.
    fn check_names(&self, spec: &ServiceSpec) -> Result<(), SpecError> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        let names = std::iter::once(spec.name.as_str()).chain(spec.fields.iter().map(|f| f.name.as_str()));
        for name in names {
            if !is_c_identifier(name) {
                return Err(SpecError::InvalidIdentifier {
                    service: spec.name.clone(),
                    name: name.to_string(),
                });
            }
            let folded = name.to_lowercase();
            if let Some(previous) = seen.insert(folded.clone(), name) {
                return Err(SpecError::DuplicateName {
                    service: spec.name.clone(),
                    name: name.to_string(),
                    previous: previous.to_string(),
                    identifier: folded,
                });
            }
        }

        Ok(())
    }

    /// Reject two entities that would emit the same C symbol, e.g. a field
    /// `Val` next to the service's own `UUID_<SVC>_VAL`.
    fn check_identifiers(
        &self,
        spec: &ServiceSpec,
        service: &ServiceIdents,
        fields: &[FieldIdents],
    ) -> Result<(), SpecError> {
        let mut owners: HashMap<String, &str> = HashMap::new();

        let claims = std::iter::once((spec.name.as_str(), service.symbols()))
            .chain(fields.iter().map(|f| (f.name.raw.as_str(), f.symbols())));
        for (owner, symbols) in claims {
            for symbol in symbols {
                if let Some(previous) = owners.insert(symbol.clone(), owner) {
                    return Err(SpecError::DuplicateName {
                        service: spec.name.clone(),
                        name: owner.to_string(),
                        previous: previous.to_string(),
                        identifier: symbol,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Capabilities, Capability};

    const BASE: &str = "11111111-2222-3333-4444-555555555555";

    fn service() -> ServiceSpec {
        ServiceSpec::new("Lbs", "aaaaaaaa", BASE)
            .with_field(FieldSpec::new(
                "Button",
                "aaaaaaab",
                Capabilities::of(&[Capability::Read, Capability::Notify]),
            ))
            .with_field(FieldSpec::new("Led", "aaaaaaac", Capabilities::of(&[Capability::Write])))
    }

    #[test]
    fn test_analyze_service() {
        let analyzed = ServiceAnalyzer::new().analyze(&service()).unwrap();

        assert_eq!(analyzed.file_stem, "lbs");
        assert_eq!(analyzed.uuid.to_string(), "aaaaaaaa-2222-3333-4444-555555555555");
        assert_eq!(analyzed.fields.len(), 2);
        assert_eq!(analyzed.fields[1].uuid.to_string(), "aaaaaaac-2222-3333-4444-555555555555");
        assert_eq!(analyzed.value_slot(&analyzed.fields[0]), Some(2));
        assert_eq!(analyzed.value_slot(&analyzed.fields[1]), None);
        assert_eq!(analyzed.callback_fields().count(), 2);
    }

    #[test]
    fn test_malformed_base_uuid() {
        let mut spec = service();
        spec.base_uuid = "1111-2222".to_string();
        let err = ServiceAnalyzer::new().analyze(&spec).unwrap_err();
        assert_eq!(
            err,
            SpecError::MalformedBaseUuid {
                service: "Lbs".to_string(),
                found: "1111-2222".to_string(),
            }
        );
    }

    #[test]
    fn test_case_folded_duplicate() {
        let spec = service().with_field(FieldSpec::new("BUTTON", "0", Capabilities::none()));
        let err = ServiceAnalyzer::new().analyze(&spec).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateName {
                service: "Lbs".to_string(),
                name: "BUTTON".to_string(),
                previous: "Button".to_string(),
                identifier: "button".to_string(),
            }
        );
    }

    #[test]
    fn test_field_named_like_service_is_rejected() {
        let spec = service().with_field(FieldSpec::new("lbs", "0", Capabilities::none()));
        assert!(matches!(
            ServiceAnalyzer::new().analyze(&spec),
            Err(SpecError::DuplicateName { .. })
        ));
    }

    #[test]
    fn test_field_clashing_with_service_macro() {
        let spec = service().with_field(FieldSpec::new("Val", "0", Capabilities::none()));
        let err = ServiceAnalyzer::new().analyze(&spec).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateName {
                service: "Lbs".to_string(),
                name: "Val".to_string(),
                previous: "Lbs".to_string(),
                identifier: "UUID_LBS_VAL".to_string(),
            }
        );
    }

    #[test]
    fn test_fields_deriving_the_same_macro() {
        let spec = service()
            .with_field(FieldSpec::new("A", "0", Capabilities::none()))
            .with_field(FieldSpec::new("A_VAL", "1", Capabilities::none()));
        let err = ServiceAnalyzer::new().analyze(&spec).unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateName {
                service: "Lbs".to_string(),
                name: "A_VAL".to_string(),
                previous: "A".to_string(),
                identifier: "UUID_LBS_A_VAL".to_string(),
            }
        );
    }

    #[test]
    fn test_distinct_fields_pass_identifier_check() {
        let spec = service()
            .with_field(FieldSpec::new("Value", "0", Capabilities::of(&[Capability::Read])))
            .with_field(FieldSpec::new("Val_Ue", "1", Capabilities::of(&[Capability::Write])));
        assert!(ServiceAnalyzer::new().analyze(&spec).is_ok());
    }

    #[test]
    fn test_invalid_identifier() {
        let spec = service().with_field(FieldSpec::new("led state", "0", Capabilities::none()));
        assert!(matches!(
            ServiceAnalyzer::new().analyze(&spec),
            Err(SpecError::InvalidIdentifier { name, .. }) if name == "led state"
        ));
    }
}
