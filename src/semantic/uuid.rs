//! 128-bit UUID assembly from a shared base

use std::fmt;

const SEGMENT_COUNT: usize = 5;

/// Base UUID shared by a service and its characteristics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUuid {
    segments: [String; SEGMENT_COUNT],
}

impl BaseUuid {
    /// Split a hyphen-joined base UUID. Returns `None` unless there are
    /// exactly five segments; hex digits are not checked.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split('-').collect();
        if parts.len() != SEGMENT_COUNT {
            return None;
        }
        Some(Self {
            segments: std::array::from_fn(|i| parts[i].to_string()),
        })
    }

    /// Copy of the base with segment 0 replaced
    pub fn with_first_segment(&self, first: &str) -> Uuid128 {
        let mut segments = self.segments.clone();
        segments[0] = first.to_string();
        Uuid128 { segments }
    }
}

/// Fully assembled UUID, kept as its textual segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uuid128 {
    segments: [String; SEGMENT_COUNT],
}

impl Uuid128 {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Argument list for Zephyr's `BT_UUID_128_ENCODE`
    pub fn encode_macro(&self) -> String {
        let args: Vec<String> = self.segments.iter().map(|s| format!("0x{}", s)).collect();
        format!("BT_UUID_128_ENCODE({})", args.join(", "))
    }
}

impl fmt::Display for Uuid128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("-"))
    }
}
