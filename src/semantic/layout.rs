//! Attribute table layout for `BT_GATT_SERVICE_DEFINE`
//!
//! The registration macro expands to one flat `struct bt_gatt_attr` array:
//!
//! ```text
//! [0]      primary service declaration
//! [+0]     characteristic declaration   \
//! [+1]     characteristic value          } per field
//! [+2]     CCC descriptor (notify/indicate only)
//! ```
//!
//! Send primitives take a pointer to the *value* attribute, so the generator
//! needs the exact index of that slot for every notifiable or indicatable
//! field.

use std::collections::BTreeMap;

use crate::model::FieldSpec;

/// Attributes contributed by every characteristic (declaration + value)
pub const CHARACTERISTIC_SLOTS: usize = 2;
/// Attribute contributed by a CCC descriptor
pub const CCC_SLOTS: usize = 1;
/// Index of the primary service declaration
pub const SERVICE_HEADER_SLOT: usize = 0;

/// Positions of one field's attributes in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlots {
    pub declaration: usize,
    pub value: usize,
    pub ccc: Option<usize>,
}

impl FieldSlots {
    /// Number of attributes the field occupies
    pub fn count(&self) -> usize {
        CHARACTERISTIC_SLOTS + if self.ccc.is_some() { CCC_SLOTS } else { 0 }
    }
}

/// Layout of a whole service table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeLayout {
    /// Slots of every field, in declaration order
    pub fields: Vec<FieldSlots>,
    /// Value slot of every notifiable/indicatable field, keyed by field name
    pub value_slots: BTreeMap<String, usize>,
    /// Attributes contributed by fields (header excluded)
    pub field_attributes: usize,
}

impl AttributeLayout {
    /// Value slot of a field that can notify or indicate
    pub fn value_slot(&self, field_name: &str) -> Option<usize> {
        self.value_slots.get(field_name).copied()
    }

    /// Total attributes in the table, service declaration included
    pub fn attribute_count(&self) -> usize {
        SERVICE_HEADER_SLOT + 1 + self.field_attributes
    }
}

/// Single ordered pass over the fields of a service
#[derive(Debug, Default)]
pub struct AttributeLayoutTracker {
    counter: usize,
    layout: AttributeLayout,
}

impl AttributeLayoutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for the next field in table order.
    ///
    /// `counter` holds the attributes of the fields seen so far, without the
    /// service declaration, so the value slot is
    /// `1 (service) + previous + 1 (declaration)`.
    pub fn push(&mut self, key: &str, field: &FieldSpec) -> FieldSlots {
        let declaration = SERVICE_HEADER_SLOT + 1 + self.counter;
        let value = declaration + 1;
        let ccc = field.capabilities.needs_ccc().then_some(value + 1);

        if ccc.is_some() {
            self.layout.value_slots.insert(key.to_string(), value);
        }

        let slots = FieldSlots {
            declaration,
            value,
            ccc,
        };
        self.counter += slots.count();
        self.layout.fields.push(slots);
        slots
    }

    pub fn finish(mut self) -> AttributeLayout {
        self.layout.field_attributes = self.counter;
        self.layout
    }

    /// Layout for `fields` keyed by the lower-case field name
    pub fn compute(fields: &[FieldSpec]) -> AttributeLayout {
        let mut tracker = Self::new();
        for field in fields {
            tracker.push(&field.name.to_lowercase(), field);
        }
        tracker.finish()
    }
}
