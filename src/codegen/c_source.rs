//! C implementation skeleton for GATT services
//!
//! Emits the runtime state, the attribute handlers, the
//! `BT_GATT_SERVICE_DEFINE` table and the bodies of the public functions.
//! Send functions address the table through the value slots computed by
//! the layout tracker.

use std::fmt::Write;

use super::c_header::send_prototype;
use super::{access_flags, file_comment, Artifact, ArtifactGenerator, ArtifactKind, CodegenError};
use crate::model::CallbackOp;
use crate::semantic::{AnalyzedField, AnalyzedService};

pub struct SourceGenerator;

impl SourceGenerator {
    pub fn new() -> Self {
        Self
    }

    fn generate_includes(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = file_comment(analyzed);

        output.push_str("#include <stddef.h>\n");
        output.push_str("#include <string.h>\n");
        output.push_str("#include <errno.h>\n\n");
        output.push_str("#include <zephyr/types.h>\n");
        output.push_str("#include <zephyr/sys/util.h>\n");
        output.push_str("#include <zephyr/kernel.h>\n");
        output.push_str("#include <zephyr/logging/log.h>\n");
        output.push_str("#include <zephyr/bluetooth/bluetooth.h>\n");
        output.push_str("#include <zephyr/bluetooth/conn.h>\n");
        output.push_str("#include <zephyr/bluetooth/uuid.h>\n");
        output.push_str("#include <zephyr/bluetooth/gatt.h>\n\n");
        writeln!(output, "#include \"{}.h\"\n", analyzed.file_stem)?;
        writeln!(output, "LOG_MODULE_REGISTER({}, LOG_LEVEL_INF);\n", analyzed.idents.log_module)?;

        Ok(output)
    }

    fn generate_uuids(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let svc = &analyzed.idents;
        let mut output = String::new();

        output.push_str("/*\n * UUID\n */\n\n");
        writeln!(output, "/// @brief {} Service UUID", svc.name.upper)?;
        writeln!(output, "#define {} \\", svc.uuid_val_macro)?;
        writeln!(output, "    {}", analyzed.uuid.encode_macro())?;
        writeln!(output, "#define {} BT_UUID_DECLARE_128({})\n", svc.uuid_macro, svc.uuid_val_macro)?;

        for field in &analyzed.fields {
            let f = &field.idents;
            writeln!(output, "/// @brief {} Characteristic UUID", f.name.upper)?;
            writeln!(output, "#define {} \\", f.uuid_val_macro)?;
            writeln!(output, "    {}", field.uuid.encode_macro())?;
            writeln!(output, "#define {} BT_UUID_DECLARE_128({})\n", f.uuid_macro, f.uuid_val_macro)?;
        }

        Ok(output)
    }

    /// Backing values and CCC flags. Write-only fields get nothing.
    fn generate_state(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = String::new();

        for field in &analyzed.fields {
            let caps = &field.spec.capabilities;
            let f = &field.idents;
            let upper = &f.name.upper;

            if caps.needs_state() {
                writeln!(output, "#define {} {}", f.length_macro, caps.value_length())?;
                writeln!(output, "/// @brief {} Characteristic value", upper)?;
                output.push_str("static struct {\n");
                output.push_str("    uint16_t len;\n");
                writeln!(output, "    uint8_t serialized[{}];", f.length_macro)?;
                writeln!(output, "}} {} = {{ .len = {} }};\n", f.state, f.length_macro)?;
            }
            if caps.notifiable() {
                writeln!(output, "/// @brief {} Characteristic notification flag", upper)?;
                writeln!(output, "static bool {};\n", f.notify_flag)?;
            }
            if caps.indicatable() {
                writeln!(output, "/// @brief {} Characteristic indication flag", upper)?;
                writeln!(output, "static bool {};", f.indicate_flag)?;
                writeln!(output, "static struct bt_gatt_indicate_params {};\n", f.indicate_params)?;
            }
        }

        Ok(output)
    }

    fn generate_callback_storage(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = String::new();
        output.push_str("/// @brief Service callbacks\n");
        writeln!(
            output,
            "static {} {};\n",
            analyzed.idents.cb_type, analyzed.idents.cb_storage
        )?;
        Ok(output)
    }

    /// One CCC change handler per notifiable/indicatable field, plus the
    /// indication completion callback.
    fn generate_ccc_handlers(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = String::new();

        for field in &analyzed.fields {
            let caps = &field.spec.capabilities;
            if !caps.needs_ccc() {
                continue;
            }
            let f = &field.idents;

            writeln!(output, "/**\n * Update {} subscription flags.\n */", f.name.upper)?;
            writeln!(
                output,
                "static void {}(const struct bt_gatt_attr *attr, uint16_t value)\n{{",
                f.ccc_changed_fn
            )?;
            output.push_str("    ARG_UNUSED(attr);\n\n");
            if caps.notifiable() {
                writeln!(output, "    {} = (value & BT_GATT_CCC_NOTIFY) != 0;", f.notify_flag)?;
            }
            if caps.indicatable() {
                writeln!(output, "    {} = (value & BT_GATT_CCC_INDICATE) != 0;", f.indicate_flag)?;
            }
            output.push_str("}\n\n");

            if caps.indicatable() {
                writeln!(
                    output,
                    "static void {}(struct bt_conn *conn, struct bt_gatt_indicate_params *params, uint8_t err)\n{{",
                    f.indicate_done_fn
                )?;
                writeln!(
                    output,
                    "    LOG_DBG(\"Indication {} Characteristic %s\", err != 0U ? \"fail\" : \"success\");",
                    f.name.upper
                )?;
                output.push_str("}\n\n");
            }
        }

        Ok(output)
    }

    fn generate_write_handlers(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = String::new();

        for field in &analyzed.fields {
            if field.spec.capabilities.writable() {
                output.push_str(&self.generate_write_handler(analyzed, field)?);
            }
        }

        Ok(output)
    }

    fn generate_write_handler(
        &self,
        analyzed: &AnalyzedService,
        field: &AnalyzedField,
    ) -> Result<String, CodegenError> {
        let caps = &field.spec.capabilities;
        let f = &field.idents;
        let name = &f.name.lower;
        let mut output = String::new();

        writeln!(
            output,
            "/**\n * Callback application function triggered by writing to {} Characteristic.\n */",
            f.name.upper
        )?;
        writeln!(output, "static ssize_t {}(", f.write_fn)?;
        output.push_str("    struct bt_conn *conn,\n");
        output.push_str("    const struct bt_gatt_attr *attr,\n");
        output.push_str("    const void *buf,\n");
        output.push_str("    uint16_t len,\n");
        output.push_str("    uint16_t offset,\n");
        output.push_str("    uint8_t flags)\n{\n");
        writeln!(
            output,
            "    LOG_DBG(\"Attribute write {}, handle: %u, conn: %p\", attr->handle, (const void *)conn);\n",
            name
        )?;

        if caps.write.check_length {
            let expected = caps.write.length.unwrap_or_else(|| caps.value_length());
            writeln!(output, "    if (len != {}U) {{", expected)?;
            writeln!(output, "        LOG_ERR(\"Write {}: Incorrect data length(%u)\", len);", name)?;
            output.push_str("        return BT_GATT_ERR(BT_ATT_ERR_INVALID_ATTRIBUTE_LEN);\n");
            output.push_str("    }\n\n");
        }

        if caps.write.check_offset {
            output.push_str("    if (offset != 0) {\n");
            writeln!(output, "        LOG_ERR(\"Write {}: Incorrect data offset(%u)\", offset);", name)?;
            output.push_str("        return BT_GATT_ERR(BT_ATT_ERR_INVALID_OFFSET);\n");
            output.push_str("    }\n\n");
        }

        if caps.needs_state() {
            writeln!(output, "    if (offset + len > sizeof({}.serialized)) {{", f.state)?;
            output.push_str("        return BT_GATT_ERR(BT_ATT_ERR_INVALID_OFFSET);\n");
            output.push_str("    }\n\n");
            writeln!(output, "    memcpy({}.serialized + offset, buf, len);", f.state)?;
            writeln!(output, "    {}.len = offset + len;\n", f.state)?;
        }

        let cb = analyzed.idents.cb_ref(f, CallbackOp::Write);
        writeln!(output, "    if ({}) {{", cb)?;
        writeln!(output, "        {}((const uint8_t *)buf, len);", cb)?;
        output.push_str("    }\n\n");
        output.push_str("    return len;\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    fn generate_read_handlers(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let mut output = String::new();

        for field in &analyzed.fields {
            if !field.spec.capabilities.readable() {
                continue;
            }
            let f = &field.idents;
            let cb = analyzed.idents.cb_ref(f, CallbackOp::Read);

            writeln!(
                output,
                "/**\n * Callback application function triggered by reading {} Characteristic.\n */",
                f.name.upper
            )?;
            writeln!(output, "static ssize_t {}(", f.read_fn)?;
            output.push_str("    struct bt_conn *conn,\n");
            output.push_str("    const struct bt_gatt_attr *attr,\n");
            output.push_str("    void *buf,\n");
            output.push_str("    uint16_t len,\n");
            output.push_str("    uint16_t offset)\n{\n");
            writeln!(
                output,
                "    LOG_DBG(\"Attribute read {}, handle: %u, conn: %p\", attr->handle, (const void *)conn);\n",
                f.name.lower
            )?;
            writeln!(output, "    if ({}) {{", cb)?;
            writeln!(
                output,
                "        int ret = {}({}.serialized, sizeof({}.serialized));\n",
                cb, f.state, f.state
            )?;
            output.push_str("        if (ret < 0) {\n");
            output.push_str("            return BT_GATT_ERR(BT_ATT_ERR_UNLIKELY);\n");
            output.push_str("        }\n");
            writeln!(
                output,
                "        {}.len = MIN((uint16_t)ret, sizeof({}.serialized));",
                f.state, f.state
            )?;
            output.push_str("    }\n\n");
            output.push_str("    return bt_gatt_attr_read(\n");
            writeln!(
                output,
                "        conn, attr, buf, len, offset, {}.serialized, {}.len);",
                f.state, f.state
            )?;
            output.push_str("}\n\n");
        }

        Ok(output)
    }

    /// The attribute table, in field declaration order. The slot comments
    /// come from the layout tracker, the same numbers the send functions use.
    fn generate_service_table(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let svc = &analyzed.idents;
        let mut output = String::new();

        writeln!(output, "// {} Service Declaration", svc.name.upper)?;
        output.push_str("BT_GATT_SERVICE_DEFINE(\n");
        writeln!(output, "    {},", svc.table)?;
        writeln!(output, "    // [0] {} Service", svc.name.upper)?;
        writeln!(output, "    BT_GATT_PRIMARY_SERVICE({}),", svc.uuid_macro)?;

        for field in &analyzed.fields {
            let caps = &field.spec.capabilities;
            let f = &field.idents;
            let (props, perms) = access_flags(caps);

            writeln!(
                output,
                "\n    // [{}..{}] {} Characteristic",
                field.slots.declaration, field.slots.value, f.name.upper
            )?;
            output.push_str("    BT_GATT_CHARACTERISTIC(\n");
            writeln!(output, "        {},", f.uuid_macro)?;
            writeln!(output, "        {},", props)?;
            writeln!(output, "        {},", perms)?;
            writeln!(output, "        {},", if caps.readable() { f.read_fn.as_str() } else { "NULL" })?;
            writeln!(output, "        {},", if caps.writable() { f.write_fn.as_str() } else { "NULL" })?;
            if caps.needs_state() {
                writeln!(output, "        &{}),", f.state)?;
            } else {
                output.push_str("        NULL),\n");
            }

            if let Some(ccc) = field.slots.ccc {
                writeln!(output, "    // [{}] {} Client Characteristic Configuration", ccc, f.name.upper)?;
                writeln!(
                    output,
                    "    BT_GATT_CCC({}, BT_GATT_PERM_READ | BT_GATT_PERM_WRITE),",
                    f.ccc_changed_fn
                )?;
            }
        }

        output.push_str(");\n\n");
        Ok(output)
    }

    fn generate_init(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let svc = &analyzed.idents;
        let mut output = String::new();

        output.push_str("\n/*\n * Functions\n */\n\n");
        writeln!(output, "int {}({} *callbacks)\n{{", svc.init_fn, svc.cb_type)?;
        output.push_str("    if (callbacks == NULL) {\n");
        output.push_str("        return -EINVAL;\n");
        output.push_str("    }\n\n");
        writeln!(output, "    {} = *callbacks;", svc.cb_storage)?;
        output.push_str("    return 0;\n");
        output.push_str("}\n\n");

        Ok(output)
    }

    fn generate_send_functions(&self, analyzed: &AnalyzedService) -> Result<String, CodegenError> {
        let svc = &analyzed.idents;
        let mut output = String::new();

        for field in &analyzed.fields {
            let caps = &field.spec.capabilities;
            let Some(slot) = analyzed.value_slot(field) else {
                continue;
            };
            let f = &field.idents;
            let attr = format!("&{}.attrs[{}]", svc.table, slot);

            if caps.notifiable() {
                output.push_str(&send_prototype(field, &f.send_notify_fn, "notification"));
                output.push_str("\n{\n");
                writeln!(output, "    if (!{}) {{", f.notify_flag)?;
                writeln!(output, "        LOG_ERR(\"{}: notification not enabled.\");", f.send_notify_fn)?;
                output.push_str("        return -EACCES;\n");
                output.push_str("    }\n\n");
                self.generate_store_value(&mut output, field)?;
                writeln!(
                    output,
                    "    return bt_gatt_notify(NULL, {}, {}.serialized, {}.len);",
                    attr, f.state, f.state
                )?;
                output.push_str("}\n\n");
            }

            if caps.indicatable() {
                let params = &f.indicate_params;
                output.push_str(&send_prototype(field, &f.send_indicate_fn, "indication"));
                output.push_str("\n{\n");
                writeln!(output, "    if (!{}) {{", f.indicate_flag)?;
                writeln!(output, "        LOG_ERR(\"{}: indication not enabled.\");", f.send_indicate_fn)?;
                output.push_str("        return -EACCES;\n");
                output.push_str("    }\n\n");
                self.generate_store_value(&mut output, field)?;
                writeln!(output, "    {}.attr = {};", params, attr)?;
                writeln!(output, "    {}.func = {};", params, f.indicate_done_fn)?;
                writeln!(output, "    {}.destroy = NULL;", params)?;
                writeln!(output, "    {}.data = {}.serialized;", params, f.state)?;
                writeln!(output, "    {}.len = {}.len;\n", params, f.state)?;
                writeln!(output, "    return bt_gatt_indicate(NULL, &{});", params)?;
                output.push_str("}\n\n");
            }
        }

        Ok(output)
    }

    /// Copy the caller's payload into the field state
    fn generate_store_value(&self, output: &mut String, field: &AnalyzedField) -> Result<(), CodegenError> {
        let state = &field.idents.state;
        writeln!(output, "    if (len > sizeof({}.serialized)) {{", state)?;
        output.push_str("        return -EINVAL;\n");
        output.push_str("    }\n\n");
        writeln!(output, "    memcpy({}.serialized, data, len);", state)?;
        writeln!(output, "    {}.len = len;\n", state)?;
        Ok(())
    }
}

impl Default for SourceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactGenerator for SourceGenerator {
    fn generate(&self, analyzed: &AnalyzedService) -> Result<Artifact, CodegenError> {
        let mut artifact = Artifact::new(ArtifactKind::Source, &analyzed.file_stem);

        artifact.push("includes", self.generate_includes(analyzed)?);
        artifact.push("uuids", self.generate_uuids(analyzed)?);
        artifact.push("state", self.generate_state(analyzed)?);
        artifact.push("callback_storage", self.generate_callback_storage(analyzed)?);
        artifact.push("ccc_handlers", self.generate_ccc_handlers(analyzed)?);
        artifact.push("write_handlers", self.generate_write_handlers(analyzed)?);
        artifact.push("read_handlers", self.generate_read_handlers(analyzed)?);
        artifact.push("service_table", self.generate_service_table(analyzed)?);
        artifact.push("init", self.generate_init(analyzed)?);
        artifact.push("send_functions", self.generate_send_functions(analyzed)?);

        Ok(artifact)
    }
}
