/// Code generation for Zephyr GATT services - C header and source

pub mod artifact;
pub mod c_header;
pub mod c_source;

pub use artifact::{Artifact, ArtifactKind, Section};
pub use c_header::HeaderGenerator;
pub use c_source::SourceGenerator;

use crate::error::CodegenError;
use crate::semantic::AnalyzedService;

/// Code generator trait
pub trait ArtifactGenerator {
    fn generate(&self, analyzed: &AnalyzedService) -> Result<Artifact, CodegenError>;
}

/// Properties and permissions of a characteristic, in macro order
pub(crate) fn access_flags(caps: &crate::model::Capabilities) -> (String, String) {
    let mut props = Vec::new();
    let mut perms = Vec::new();
    if caps.writable() {
        props.push("BT_GATT_CHRC_WRITE");
        perms.push("BT_GATT_PERM_WRITE");
    }
    if caps.readable() {
        props.push("BT_GATT_CHRC_READ");
        perms.push("BT_GATT_PERM_READ");
    }
    if caps.notifiable() {
        props.push("BT_GATT_CHRC_NOTIFY");
    }
    if caps.indicatable() {
        props.push("BT_GATT_CHRC_INDICATE");
    }
    if props.is_empty() {
        props.push("0");
    }
    if perms.is_empty() {
        perms.push("BT_GATT_PERM_NONE");
    }
    (props.join(" | "), perms.join(" | "))
}

/// `@file` comment shared by both artifacts
pub(crate) fn file_comment(analyzed: &AnalyzedService) -> String {
    let text = analyzed
        .spec
        .header_comment
        .clone()
        .unwrap_or_else(|| format!("{} Service", analyzed.idents.name.upper));
    format!("/**\n * @file\n * {}\n */\n\n", text)
}
