use std::fs;
use std::path::Path;

use binder::canonicalize_or_current;
use binder::commands::{resolve_config, ConfigOverrides};
use tempfile::tempdir;

/// Both cases change the process cwd, so they run in one test.
#[test]
fn canonicalize_or_current_resolves_against_cwd() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let dot = canonicalize_or_current(Path::new(".")).expect("canonicalize").canonicalize().expect("canon");
    assert_eq!(dot, tmp.path().canonicalize().expect("canon tmp"));

    let nested = canonicalize_or_current(Path::new("nested")).expect("canonicalize nested");
    assert_eq!(nested, subdir.canonicalize().expect("canonicalize subdir"));

    let absent = canonicalize_or_current(Path::new("not-yet/out.bin")).expect("absent path");
    assert!(absent.is_absolute());
    assert!(absent.ends_with("not-yet/out.bin"));

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn flags_override_config_file() {
    let tmp = tempdir().expect("tempdir");
    let config_path = tmp.path().join("binder.json");
    fs::write(
        &config_path,
        r#"{ "loader_dir": "from-file", "toolchain": { "cargo": "/usr/bin/cargo", "offline": false } }"#,
    )
    .expect("write config");

    let from_file = resolve_config(&ConfigOverrides {
        config: Some(config_path.clone()),
        ..ConfigOverrides::default()
    })
    .expect("resolve from file");
    assert!(from_file.loader_dir.ends_with("from-file"));
    assert!(from_file.toolchain.release);

    let overridden = resolve_config(&ConfigOverrides {
        config: Some(config_path),
        loader_dir: Some(tmp.path().to_path_buf()),
        cargo: Some("cargo-nightly".into()),
        debug: true,
        offline: true,
        ..ConfigOverrides::default()
    })
    .expect("resolve with flags");
    assert_eq!(overridden.loader_dir, tmp.path().canonicalize().expect("canon"));
    assert_eq!(overridden.toolchain.cargo, Some("cargo-nightly".into()));
    assert!(!overridden.toolchain.release);
    assert!(overridden.toolchain.offline);
}
