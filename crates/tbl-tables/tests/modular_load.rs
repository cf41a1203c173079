//! Layered loading of AI profiles from a directory.

use std::fs;
use std::path::Path;

use tbl_parse::{AbortCode, DirFileSystem, INTERNAL_FILENAME};
use tbl_tables::{AiProfileFlags, LoadConfig, load_ai_profiles};

/// Routes parser diagnostics to the test harness output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn write_table(root: &Path, name: &str, text: &str) {
    let dir = root.join("tables");
    fs::create_dir_all(&dir).expect("create tables dir");
    fs::write(dir.join(name), text).expect("write table");
}

#[test]
fn builtin_profile_loads_without_files() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let fs = DirFileSystem::new(dir.path());

    let (profiles, outcome) = load_ai_profiles(&fs, &LoadConfig::default()).expect("load");

    assert!(outcome.is_clean());
    assert_eq!(outcome.parsed, vec![INTERNAL_FILENAME.to_string()]);
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles.default_index(), 0);
}

#[test]
fn base_and_overlays_layer_in_order() {
    init_tracing();
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "ai_profiles.tbl",
        "#AI Profiles\n\
         $Default Profile: Hard Mode\n\
         $Profile Name: Hard Mode\n\
         $Max Player Attackers: 9, 9, 9, 9, 9\n\
         #End\n",
    );
    write_table(
        dir.path(),
        "b-aip.tbm",
        "#AI Profiles\n$Profile Name: hard mode\n+nocreate\n$Max Incoming Asteroids: 1, 1, 1, 1, 1\n#End\n",
    );
    write_table(
        dir.path(),
        "a-aip.tbm",
        "#AI Profiles\n$Profile Name: HARD MODE\n+nocreate\n$Max Incoming Asteroids: 2, 2, 2, 2, 2\n#End\n",
    );
    write_table(dir.path(), "unrelated.tbm", "not a table\n");
    let fs = DirFileSystem::new(dir.path());

    let (profiles, outcome) = load_ai_profiles(&fs, &LoadConfig::default()).expect("load");

    assert!(outcome.is_clean());
    assert_eq!(
        outcome.parsed,
        vec![INTERNAL_FILENAME, "ai_profiles.tbl", "b-aip.tbm", "a-aip.tbm"]
    );
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles.default_index(), 1);

    let retail = profiles.get(0).expect("retail");
    let hard = profiles.default_record().expect("default");
    assert_eq!(hard.profile_name, "Hard Mode");
    assert_eq!(hard.max_attackers, [9; 5]);
    assert_eq!(hard.max_incoming_asteroids, [2; 5]);
    // Fields the overlays never mention come from the template.
    assert_eq!(hard.afterburner_recharge_scale, retail.afterburner_recharge_scale);
}

#[test]
fn broken_overlay_does_not_stop_later_files() {
    init_tracing();
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "z-aip.tbm",
        "#AI Profiles\n$Profile Name: Broken\n$Max Player Attackers: ( 1 2\n",
    );
    write_table(
        dir.path(),
        "m-aip.tbm",
        "#AI Profiles\n$Profile Name: FS2 RETAIL\n+nocreate\n$smart primary weapon selection: YES\n#End\n",
    );
    let fs = DirFileSystem::new(dir.path());

    let (profiles, outcome) = load_ai_profiles(&fs, &LoadConfig::default()).expect("load");

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file, "z-aip.tbm");
    assert_eq!(outcome.failures[0].error.code(), AbortCode::MissingEither);
    assert!(outcome.parsed.contains(&"m-aip.tbm".to_string()));

    let retail = profiles.get(0).expect("retail");
    assert!(retail.flags.contains(AiProfileFlags::SMART_PRIMARY_WEAPON_SELECTION));
}

#[test]
fn record_ceiling_comes_from_config() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "ai_profiles.tbl",
        "#AI Profiles\n$Profile Name: Extra\n$Profile Name: Another\n#End\n",
    );
    let fs = DirFileSystem::new(dir.path());
    let config = LoadConfig {
        max_records: Some(2),
        ..LoadConfig::default()
    };

    let (profiles, outcome) = load_ai_profiles(&fs, &config).expect("load");

    assert!(outcome.is_clean());
    assert_eq!(profiles.len(), 2);
    assert!(profiles.lookup("Another").is_none());
}
