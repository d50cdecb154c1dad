//! Identifier derivation for generated C symbols
//!
//! Every symbol that appears in both the header and the source is built
//! here, so the two artifacts cannot drift apart on naming.

use crate::model::CallbackOp;

/// Canonical lower/upper forms of a raw name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub raw: String,
    pub lower: String,
    pub upper: String,
}

impl CanonicalName {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            lower: raw.to_lowercase(),
            upper: raw.to_uppercase(),
        }
    }
}

/// Map every character that cannot appear in a C identifier to `_`
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Check that `name` is usable as-is inside C identifiers
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Service-level identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceIdents {
    pub name: CanonicalName,
    pub include_guard: String,
    pub cb_type: String,
    pub cb_storage: String,
    pub init_fn: String,
    pub table: String,
    pub uuid_macro: String,
    pub uuid_val_macro: String,
    pub log_module: String,
}

impl ServiceIdents {
    pub fn derive(service_name: &str, file_stem: &str) -> Self {
        let name = CanonicalName::new(service_name);
        let include_guard = format!("{}_H_", sanitize_identifier(&file_stem.to_uppercase()));
        let uuid_macro = format!("UUID_{}", name.upper);

        Self {
            include_guard,
            cb_type: format!("struct {}_cb", name.lower),
            cb_storage: format!("{}_cb", name.lower),
            init_fn: format!("{}_init", name.lower),
            table: format!("{}_svc", name.lower),
            uuid_val_macro: format!("{}_VAL", uuid_macro),
            uuid_macro,
            log_module: format!("{}_svc", name.lower),
            name,
        }
    }

    /// File-scope C symbols owned by the service. The struct tag and the
    /// log module live in their own namespaces and are left out.
    pub fn symbols(&self) -> Vec<String> {
        vec![
            self.include_guard.clone(),
            self.cb_storage.clone(),
            self.init_fn.clone(),
            self.table.clone(),
            self.uuid_macro.clone(),
            self.uuid_val_macro.clone(),
        ]
    }

    /// Callback member as referenced from the implementation
    pub fn cb_ref(&self, field: &FieldIdents, op: CallbackOp) -> String {
        format!("{}.{}", self.cb_storage, field.cb_member(op))
    }
}

/// Per-field identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIdents {
    pub name: CanonicalName,
    pub state: String,
    pub notify_flag: String,
    pub indicate_flag: String,
    pub indicate_params: String,
    pub ccc_changed_fn: String,
    pub indicate_done_fn: String,
    pub read_fn: String,
    pub write_fn: String,
    pub send_notify_fn: String,
    pub send_indicate_fn: String,
    pub uuid_macro: String,
    pub uuid_val_macro: String,
    pub length_macro: String,
}

impl FieldIdents {
    pub fn derive(service: &ServiceIdents, field_name: &str) -> Self {
        let name = CanonicalName::new(field_name);
        let svc = &service.name.lower;
        let field = &name.lower;
        let uuid_macro = format!("{}_{}", service.uuid_macro, name.upper);

        Self {
            state: format!("{}_state", field),
            notify_flag: format!("notify_{}_enabled", field),
            indicate_flag: format!("indicate_{}_enabled", field),
            indicate_params: format!("indicate_{}_params", field),
            ccc_changed_fn: format!("{}_ccc_cfg_changed", field),
            indicate_done_fn: format!("{}_indicate_cb", field),
            read_fn: format!("read_{}", field),
            write_fn: format!("write_{}", field),
            send_notify_fn: format!("{}_send_{}_notify", svc, field),
            send_indicate_fn: format!("{}_send_{}_indicate", svc, field),
            uuid_val_macro: format!("{}_VAL", uuid_macro),
            uuid_macro,
            length_macro: format!("{}_{}_LEN", service.name.upper, name.upper),
            name,
        }
    }

    /// File-scope C symbols the field may emit, whatever its capabilities
    pub fn symbols(&self) -> Vec<String> {
        vec![
            self.state.clone(),
            self.notify_flag.clone(),
            self.indicate_flag.clone(),
            self.indicate_params.clone(),
            self.ccc_changed_fn.clone(),
            self.indicate_done_fn.clone(),
            self.read_fn.clone(),
            self.write_fn.clone(),
            self.send_notify_fn.clone(),
            self.send_indicate_fn.clone(),
            self.uuid_macro.clone(),
            self.uuid_val_macro.clone(),
            self.length_macro.clone(),
            self.cb_type(CallbackOp::Write),
            self.cb_type(CallbackOp::Read),
        ]
    }

    /// Member name inside the callback struct
    pub fn cb_member(&self, op: CallbackOp) -> String {
        format!("{}_{}_cb", self.name.lower, op)
    }

    /// Function pointer type of the callback
    pub fn cb_type(&self, op: CallbackOp) -> String {
        format!("{}_t", self.cb_member(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_idents() {
        let svc = ServiceIdents::derive("Lbs", "led-button");
        assert_eq!(svc.include_guard, "LED_BUTTON_H_");
        assert_eq!(svc.cb_type, "struct lbs_cb");
        assert_eq!(svc.cb_storage, "lbs_cb");
        assert_eq!(svc.init_fn, "lbs_init");
        assert_eq!(svc.table, "lbs_svc");
        assert_eq!(svc.uuid_macro, "UUID_LBS");
        assert_eq!(svc.uuid_val_macro, "UUID_LBS_VAL");
    }

    #[test]
    fn test_field_idents() {
        let svc = ServiceIdents::derive("Lbs", "lbs");
        let field = FieldIdents::derive(&svc, "Button");
        assert_eq!(field.cb_type(CallbackOp::Read), "button_read_cb_t");
        assert_eq!(field.cb_member(CallbackOp::Write), "button_write_cb");
        assert_eq!(svc.cb_ref(&field, CallbackOp::Read), "lbs_cb.button_read_cb");
        assert_eq!(field.state, "button_state");
        assert_eq!(field.notify_flag, "notify_button_enabled");
        assert_eq!(field.indicate_flag, "indicate_button_enabled");
        assert_eq!(field.send_notify_fn, "lbs_send_button_notify");
        assert_eq!(field.send_indicate_fn, "lbs_send_button_indicate");
        assert_eq!(field.uuid_macro, "UUID_LBS_BUTTON");
        assert_eq!(field.length_macro, "LBS_BUTTON_LEN");
    }

    #[test]
    fn test_c_identifier_check() {
        assert!(is_c_identifier("button_1"));
        assert!(is_c_identifier("_x"));
        assert!(!is_c_identifier("1button"));
        assert!(!is_c_identifier("led state"));
        assert!(!is_c_identifier(""));
    }
}
