//! C header generation for GATT services
//!
//! Generates the public interface: callback types, the callback struct and
//! the init/send prototypes.

use super::{file_comment, Artifact, ArtifactGenerator, ArtifactKind, CodegenError};
use crate::model::CallbackOp;
use crate::semantic::{AnalyzedField, AnalyzedService};

pub struct HeaderGenerator;

impl HeaderGenerator {
    pub fn new() -> Self {
        Self
    }

    fn generate_prologue(&self, analyzed: &AnalyzedService) -> String {
        let guard = &analyzed.idents.include_guard;
        let mut output = file_comment(analyzed);

        output.push_str(&format!("#ifndef {}\n", guard));
        output.push_str(&format!("#define {}\n\n", guard));

        // C++ compatibility
        output.push_str("#ifdef __cplusplus\n");
        output.push_str("extern \"C\" {\n");
        output.push_str("#endif // __cplusplus\n\n");

        output
    }

    fn generate_includes(&self) -> String {
        "#include <stdint.h>\n\n".to_string()
    }

    /// Function pointer typedefs, one per declared read/write capability
    fn generate_callback_types(&self, analyzed: &AnalyzedService) -> String {
        let mut output = String::new();

        for field in &analyzed.fields {
            for op in field.spec.capabilities.callback_ops() {
                output.push_str(&self.generate_callback_type(field, op));
            }
        }

        if output.is_empty() {
            output
        } else {
            format!("\n/*\n * Types\n */\n\n{}", output)
        }
    }

    fn generate_callback_type(&self, field: &AnalyzedField, op: CallbackOp) -> String {
        let upper = &field.idents.name.upper;
        let cb_type = field.idents.cb_type(op);
        match op {
            CallbackOp::Write => format!(
                "/// @brief Write callback type for {} Characteristic.\n\
                 typedef int (*{})(const uint8_t *data, uint16_t len);\n\n",
                upper, cb_type
            ),
            // A read callback fills `data` (at most `len` bytes) and returns
            // the number of bytes written or a negative error.
            CallbackOp::Read => format!(
                "/// @brief Read callback type for {} Characteristic.\n\
                 typedef int (*{})(uint8_t *data, uint16_t len);\n\n",
                upper, cb_type
            ),
        }
    }

    fn generate_callback_struct(&self, analyzed: &AnalyzedService) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "/// @brief Callback struct used by the {} Service.\n",
            analyzed.idents.name.upper
        ));
        output.push_str(&format!("{} {{\n", analyzed.idents.cb_type));

        let mut members = 0;
        for field in analyzed.callback_fields() {
            for op in field.spec.capabilities.callback_ops() {
                output.push_str(&format!(
                    "    {} {};\n",
                    field.idents.cb_type(op),
                    field.idents.cb_member(op)
                ));
                members += 1;
            }
        }

        // Empty structs are not valid C
        if members == 0 {
            output.push_str("    uint8_t reserved;\n");
        }

        output.push_str("};\n\n");
        output
    }

    fn generate_init_prototype(&self, analyzed: &AnalyzedService) -> String {
        let mut output = String::new();
        output.push_str("\n/*\n * Functions\n */\n\n");
        output.push_str(&format!(
            "/// @brief Initialize the {} Service.\n",
            analyzed.idents.name.upper
        ));
        output.push_str(&format!(
            "int {}({} *callbacks);\n\n",
            analyzed.idents.init_fn, analyzed.idents.cb_type
        ));
        output
    }

    fn generate_send_prototypes(&self, analyzed: &AnalyzedService) -> String {
        let mut output = String::new();

        for field in &analyzed.fields {
            let caps = &field.spec.capabilities;
            if caps.notifiable() {
                output.push_str(&send_prototype(field, &field.idents.send_notify_fn, "notification"));
                output.push_str(";\n\n");
            }
            if caps.indicatable() {
                output.push_str(&send_prototype(field, &field.idents.send_indicate_fn, "indication"));
                output.push_str(";\n\n");
            }
        }

        output
    }

    fn generate_epilogue(&self, analyzed: &AnalyzedService) -> String {
        let mut output = String::new();

        output.push_str("#ifdef __cplusplus\n");
        output.push_str("}\n");
        output.push_str("#endif // __cplusplus\n\n");
        output.push_str(&format!("#endif // {}\n", analyzed.idents.include_guard));

        output
    }
}

impl Default for HeaderGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactGenerator for HeaderGenerator {
    fn generate(&self, analyzed: &AnalyzedService) -> Result<Artifact, CodegenError> {
        let mut artifact = Artifact::new(ArtifactKind::Header, &analyzed.file_stem);

        artifact.push("prologue", self.generate_prologue(analyzed));
        artifact.push("includes", self.generate_includes());
        artifact.push("callback_types", self.generate_callback_types(analyzed));
        artifact.push("callback_struct", self.generate_callback_struct(analyzed));
        artifact.push("init_prototype", self.generate_init_prototype(analyzed));
        artifact.push("send_prototypes", self.generate_send_prototypes(analyzed));
        artifact.push("epilogue", self.generate_epilogue(analyzed));

        Ok(artifact)
    }
}

/// Doc comment and signature of a send function, without terminator.
/// Shared with the source generator so both files agree on the signature.
pub(crate) fn send_prototype(field: &AnalyzedField, func_name: &str, mode: &str) -> String {
    format!(
        "/// @brief {} sends the value by {} through {} characteristic.\n\
         int {}(const uint8_t *data, uint16_t len)",
        func_name, mode, field.idents.name.lower, func_name
    )
}
