//! End-to-end tests: configuration document to written artifacts

use gatt_gen::*;
use std::fs;
use tempfile::TempDir;

fn load_sample() -> Vec<ServiceSpec> {
    config::parse_document(include_str!("lbs.json")).expect("config failed")
}

#[test]
fn test_sample_layout() {
    let specs = load_sample();
    let lbs = analyze(&specs[0]).expect("analysis failed");

    assert_eq!(lbs.layout.value_slot("button"), Some(2));
    assert_eq!(lbs.layout.value_slot("led"), None);
    assert_eq!(lbs.layout.value_slot("alert"), Some(7));
    assert_eq!(lbs.layout.attribute_count(), 9);

    let env = analyze(&specs[1]).expect("analysis failed");
    assert_eq!(env.layout.value_slot("temperature"), Some(2));
    assert_eq!(env.layout.value_slots.len(), 1);
}

#[test]
fn test_header_content() {
    let specs = load_sample();
    let generated = generate(&specs[0]).expect("generation failed");
    let header = generated.header.render();

    assert_eq!(generated.header.file_name, "lbs_service.h");
    assert!(header.contains(" * LED Button Service\n"));
    assert!(header.contains("#ifndef LBS_SERVICE_H_\n#define LBS_SERVICE_H_\n"));

    // Types in field order, write before read within a field
    let button = header.find("typedef int (*button_read_cb_t)(uint8_t *data, uint16_t len);").unwrap();
    let led = header.find("typedef int (*led_write_cb_t)(const uint8_t *data, uint16_t len);").unwrap();
    let alert = header.find("typedef int (*alert_read_cb_t)").unwrap();
    assert!(button < led && led < alert);

    assert!(header.contains(
        "struct lbs_cb {\n    button_read_cb_t button_read_cb;\n    led_write_cb_t led_write_cb;\n    alert_read_cb_t alert_read_cb;\n};\n"
    ));

    assert!(header.contains("int lbs_init(struct lbs_cb *callbacks);"));
    assert!(header.contains("int lbs_send_button_notify(const uint8_t *data, uint16_t len);"));
    assert!(header.contains("int lbs_send_alert_notify(const uint8_t *data, uint16_t len);"));
    assert!(header.contains("int lbs_send_alert_indicate(const uint8_t *data, uint16_t len);"));
    assert!(!header.contains("lbs_send_button_indicate"));
}

#[test]
fn test_source_content() {
    let specs = load_sample();
    let generated = generate(&specs[0]).expect("generation failed");
    let source = generated.source.render();

    assert_eq!(
        generated.source.section_names(),
        vec![
            "includes",
            "uuids",
            "state",
            "callback_storage",
            "ccc_handlers",
            "write_handlers",
            "read_handlers",
            "service_table",
            "init",
            "send_functions",
        ]
    );

    assert!(source.contains("#include \"lbs_service.h\"\n"));
    assert!(source.contains(
        "#define UUID_LBS_VAL \\\n    BT_UUID_128_ENCODE(0x00001523, 0x1212, 0xefde, 0x1523, 0x785feabcd123)\n"
    ));
    assert!(source.contains("#define LBS_ALERT_LEN 4\n"));
    assert!(!source.contains("led_state"));

    // Table order and slot comments
    assert!(source.contains("    // [1..2] BUTTON Characteristic\n"));
    assert!(source.contains("    // [3] BUTTON Client Characteristic Configuration\n"));
    assert!(source.contains("    // [4..5] LED Characteristic\n"));
    assert!(source.contains("    // [6..7] ALERT Characteristic\n"));
    assert!(source.contains("    // [8] ALERT Client Characteristic Configuration\n"));
    assert!(source.contains("        BT_GATT_CHRC_READ | BT_GATT_CHRC_NOTIFY | BT_GATT_CHRC_INDICATE,\n"));

    // Sends reference the recorded slots
    assert!(source.contains("bt_gatt_notify(NULL, &lbs_svc.attrs[2], button_state.serialized, button_state.len);"));
    assert!(source.contains("bt_gatt_notify(NULL, &lbs_svc.attrs[7], alert_state.serialized, alert_state.len);"));
    assert!(source.contains("indicate_alert_params.attr = &lbs_svc.attrs[7];"));
}

#[test]
fn test_generation_is_deterministic() {
    let specs = load_sample();
    let first = generate_all(&specs).expect("generation failed");
    let second = generate_all(&specs).expect("generation failed");

    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.header.render(), b.header.render());
        assert_eq!(a.source.render(), b.source.render());
    }
}

#[test]
fn test_file_generation() {
    let specs = load_sample();
    let generated = generate_all(&specs).expect("generation failed");

    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let out = temp_dir.path().join("generated");
    let artifacts: Vec<&Artifact> = generated.iter().flat_map(|g| g.artifacts()).collect();
    let written = output::write_artifacts(&out, artifacts).expect("write failed");

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["lbs_service.h", "lbs_service.c", "env.h", "env.c"]);

    let contents = fs::read_to_string(out.join("env.c")).expect("failed to read file");
    assert_eq!(contents, generated[1].source.render());
}

#[test]
fn test_config_file_loading() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let path = temp_dir.path().join("services.json");
    fs::write(&path, include_str!("lbs.json")).expect("failed to write config");

    let specs = config::load(&path).expect("load failed");
    assert_eq!(specs, load_sample());

    let missing = config::load(&temp_dir.path().join("missing.json"));
    assert!(matches!(missing, Err(ConfigError::Read { .. })));
}

const BAD_BASE: &str = r#"{
    "base_uuid": "00000000-1212-efde",
    "services": [ { "name": "Broken", "uuid": "00001600" } ]
}"#;

#[test]
fn test_failed_run_writes_nothing() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let good = temp_dir.path().join("good.json");
    let bad = temp_dir.path().join("bad.json");
    fs::write(&good, include_str!("lbs.json")).expect("failed to write config");
    fs::write(&bad, BAD_BASE).expect("failed to write config");

    let specs = load_all(&[&good, &bad]).expect("load failed");
    assert_eq!(specs.len(), 3);

    let out = temp_dir.path().join("generated");
    let result = generate_into(&specs, &out, Selection::ALL);
    assert!(matches!(
        result,
        Err(GenError::Spec(SpecError::MalformedBaseUuid { ref service, .. })) if service == "Broken"
    ));
    assert!(!out.exists());
}

#[test]
fn test_same_output_from_two_files_is_rejected() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let first = temp_dir.path().join("first.json");
    let second = temp_dir.path().join("second.json");
    fs::write(&first, include_str!("lbs.json")).expect("failed to write config");
    fs::write(&second, include_str!("lbs.json")).expect("failed to write config");

    let specs = load_all(&[&first, &second]).expect("load failed");
    let out = temp_dir.path().join("generated");

    assert!(matches!(
        generate_into(&specs, &out, Selection::ALL),
        Err(GenError::Spec(SpecError::DuplicateOutput { ref filename })) if filename == "lbs_service"
    ));
    assert!(!out.exists());

    assert!(matches!(
        check_all(&specs),
        Err(GenError::Spec(SpecError::DuplicateOutput { .. }))
    ));
}

#[test]
fn test_header_only_selection() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let out = temp_dir.path().join("generated");
    let selection = Selection {
        header: true,
        source: false,
    };

    let written = generate_into(&load_sample(), &out, selection).expect("generation failed");
    assert_eq!(written, vec![out.join("lbs_service.h"), out.join("env.h")]);
    assert!(!out.join("env.c").exists());
}
