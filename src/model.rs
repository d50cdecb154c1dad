//! Service model shared by the analyzer and the code generators

use std::fmt;

/// Default serialized length of a field value, in bytes
pub const DEFAULT_VALUE_LENGTH: u16 = 1;

/// One GATT service to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    /// First UUID segment, substituted into the base UUID
    pub uuid: String,
    /// Raw base UUID, five hyphen-separated segments
    pub base_uuid: String,
    /// Output file stem; defaults to the lower-case service name
    pub filename: Option<String>,
    /// Text placed in the `@file` comment of both artifacts
    pub header_comment: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>, base_uuid: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            base_uuid: base_uuid.into(),
            filename: None,
            header_comment: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Output file stem for both artifacts
    pub fn file_stem(&self) -> String {
        self.filename
            .clone()
            .unwrap_or_else(|| self.name.to_lowercase())
    }
}

/// One characteristic of a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub uuid: String,
    pub capabilities: Capabilities,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, uuid: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            name: name.into(),
            uuid: uuid.into(),
            capabilities,
        }
    }
}

/// A single access capability of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Notify,
    Indicate,
}

impl Capability {
    const fn bit(self) -> u8 {
        match self {
            Capability::Read => 0b0001,
            Capability::Write => 0b0010,
            Capability::Notify => 0b0100,
            Capability::Indicate => 0b1000,
        }
    }
}

/// Closed set of capabilities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);

    pub fn of(caps: &[Capability]) -> Self {
        caps.iter().fold(Self::EMPTY, |set, cap| set.with(*cap))
    }

    pub const fn with(self, cap: Capability) -> Self {
        CapabilitySet(self.0 | cap.bit())
    }

    pub fn insert(&mut self, cap: Capability) {
        self.0 |= cap.bit();
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Operation a registered application callback serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOp {
    Write,
    Read,
}

impl CallbackOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CallbackOp::Write => "write",
            CallbackOp::Read => "read",
        }
    }
}

impl fmt::Display for CallbackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options attached to the read capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Declared serialized length of the value
    pub length: Option<u16>,
}

/// Options attached to the write capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Expected length of a written value
    pub length: Option<u16>,
    /// Reject writes whose length differs from the value length
    pub check_length: bool,
    /// Reject writes at a non-zero offset
    pub check_offset: bool,
}

/// Per-field capability description.
///
/// Every decision the generators make about a field (which callbacks exist,
/// which handlers are emitted, whether the field takes a CCC slot) is a
/// function of `set`. The option structs only refine the rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub set: CapabilitySet,
    pub read: ReadOptions,
    pub write: WriteOptions,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn of(caps: &[Capability]) -> Self {
        Self {
            set: CapabilitySet::of(caps),
            ..Self::default()
        }
    }

    pub fn with_read_options(mut self, read: ReadOptions) -> Self {
        self.read = read;
        self
    }

    pub fn with_write_options(mut self, write: WriteOptions) -> Self {
        self.write = write;
        self
    }

    pub fn readable(&self) -> bool {
        self.set.contains(Capability::Read)
    }

    pub fn writable(&self) -> bool {
        self.set.contains(Capability::Write)
    }

    pub fn notifiable(&self) -> bool {
        self.set.contains(Capability::Notify)
    }

    pub fn indicatable(&self) -> bool {
        self.set.contains(Capability::Indicate)
    }

    /// Field owns a client characteristic configuration descriptor
    pub fn needs_ccc(&self) -> bool {
        self.notifiable() || self.indicatable()
    }

    /// Field needs a backing runtime value
    pub fn needs_state(&self) -> bool {
        self.readable() || self.needs_ccc()
    }

    /// Application callbacks registered for this field, in struct order
    pub fn callback_ops(&self) -> Vec<CallbackOp> {
        let mut ops = Vec::with_capacity(2);
        if self.writable() {
            ops.push(CallbackOp::Write);
        }
        if self.readable() {
            ops.push(CallbackOp::Read);
        }
        ops
    }

    /// Serialized length of the field value
    pub fn value_length(&self) -> u16 {
        self.read
            .length
            .or(self.write.length)
            .unwrap_or(DEFAULT_VALUE_LENGTH)
    }
}
