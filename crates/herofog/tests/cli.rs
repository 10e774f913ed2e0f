use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use fogconfig::{Preset, RenderConfig};
use tempfile::TempDir;

fn herofog(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_herofog"))
        .env("HEROFOG_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run herofog")
}

#[test]
fn config_prints_resolved_preset_as_toml() {
    let root = TempDir::new().unwrap();
    let output = herofog(root.path(), &["--preset", "hero", "config"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let printed = String::from_utf8(output.stdout).unwrap();
    let parsed = RenderConfig::from_toml_str(&printed).unwrap();
    assert_eq!(parsed, Preset::Hero.config());
    assert!(printed.contains("tint = \"#9AE7FF\""));
}

#[test]
fn config_file_is_discovered_in_config_dir() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("fog.toml"), "version = 1\nwarp = 0.25\n").unwrap();

    let output = herofog(root.path(), &["config", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["warp"], 0.25);
    assert_eq!(value["background"], "#0A0B14");
}

#[test]
fn explicit_config_path_wins() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("fog.toml"), "warp = 0.25\n").unwrap();
    let explicit = root.path().join("other.toml");
    fs::write(&explicit, "warp = 0.5\n").unwrap();

    let output = herofog(
        root.path(),
        &["--config", explicit.to_str().unwrap(), "config", "--json"],
    );
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["warp"], 0.5);
}

#[test]
fn malformed_tint_fails_before_rendering() {
    let root = TempDir::new().unwrap();
    let output = herofog(root.path(), &["--tint", "#GGGGGG", "config"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid tint color"), "{stderr}");
}

#[test]
fn unsupported_config_version_is_rejected() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("fog.toml"), "version = 2\n").unwrap();
    let output = herofog(root.path(), &["config"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unsupported config version"));
}

#[test]
fn export_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let target = root.path().join("fog.png");
    let output = herofog(
        root.path(),
        &[
            "export",
            "--output",
            target.to_str().unwrap(),
            "--size",
            "64x36",
            "--time",
            "2.5",
            "--pointer",
            "0.8,0.4",
        ],
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let bytes = fs::read(&target).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!(&bytes[12..16], b"IHDR");
    let width = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
    let height = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
    assert_eq!((width, height), (64, 36));
}

#[test]
fn export_rejects_out_of_range_pointer() {
    let root = TempDir::new().unwrap();
    let target = root.path().join("fog.png");
    let output = herofog(
        root.path(),
        &["export", "--output", target.to_str().unwrap(), "--pointer", "2,0"],
    );
    assert!(!output.status.success());
    assert!(!target.exists());
}
