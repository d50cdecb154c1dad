//! gatt-gen: Zephyr GATT service boilerplate generator
//!
//! Code generation tool - suppress style lints
#![allow(clippy::useless_format)]
#![allow(clippy::single_char_add_str)]
#![allow(clippy::empty_line_after_doc_comments)]

pub mod codegen;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod semantic;

// Re-export main types
pub use codegen::{Artifact, ArtifactGenerator, ArtifactKind, HeaderGenerator, SourceGenerator};
pub use error::*;
pub use model::*;
pub use pipeline::{analyze, check_all, generate, generate_all, generate_into, load_all, GeneratedService, Selection};
pub use semantic::{AnalyzedField, AnalyzedService, AttributeLayout, AttributeLayoutTracker, ServiceAnalyzer};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_generation() {
        let spec = ServiceSpec::new("Lbs", "00001523", "00000000-1212-efde-1523-785feabcd123")
            .with_field(FieldSpec::new("Button", "00001524", Capabilities::of(&[Capability::Read])));
        let generated = generate(&spec).unwrap();
        assert!(generated.header.render().contains("button_read_cb_t"));
        assert!(generated.source.render().contains("static ssize_t read_button("));
    }
}
