//! Shared helpers for binder-core integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Minimal manifest matching the bundled loader's binary name.
pub const LOADER_MANIFEST: &str = "[package]\nname = \"bound\"\nversion = \"0.1.0\"\nedition = \"2021\"\n";

/// Template that only references both payload parameters.
pub const SIMPLE_TEMPLATE: &str = "// a={{ prog_a }} b={{ prog_b }}\nfn main() {}\n";

/// Isolated test environment: a loader directory, an input directory, an
/// output directory, and a parent for build workspaces.
pub struct TestEnv {
    pub temp: TempDir,
    pub loader_dir: PathBuf,
    pub inputs_dir: PathBuf,
    pub out_dir: PathBuf,
    pub workspaces_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let loader_dir = temp.path().join("loader");
        let inputs_dir = temp.path().join("inputs");
        let out_dir = temp.path().join("out");
        let workspaces_dir = temp.path().join("workspaces");
        for dir in [&loader_dir, &inputs_dir, &out_dir, &workspaces_dir] {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(loader_dir.join("Cargo.toml"), LOADER_MANIFEST).unwrap();
        std::fs::write(loader_dir.join("main.rs.tpl"), SIMPLE_TEMPLATE).unwrap();
        Self { temp, loader_dir, inputs_dir, out_dir, workspaces_dir }
    }

    /// Write an input payload of `len` deterministic bytes.
    pub fn input(&self, name: &str, len: usize, seed: u8) -> PathBuf {
        let path = self.inputs_dir.join(name);
        let bytes: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// Names of everything left under the workspace parent.
    pub fn leftover_workspaces(&self) -> Vec<String> {
        std::fs::read_dir(&self.workspaces_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }
}

/// Write an executable shell script and wait until it can be executed.
///
/// Tests run on parallel threads; a concurrent fork may briefly hold the write
/// descriptor open, which makes exec fail with ETXTBSY. One successful
/// `--version` run proves no writer remains.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    for _ in 0..100 {
        match std::process::Command::new(path).arg("--version").output() {
            Ok(_) => return,
            Err(e) if e.raw_os_error() == Some(26) => {
                std::thread::sleep(std::time::Duration::from_millis(10))
            }
            Err(e) => panic!("failed to run {}: {e}", path.display()),
        }
    }
    panic!("{} stayed busy", path.display());
}

/// Fake cargo: answers `--version`, otherwise leaves `target/release/bound`
/// in the current directory holding the concatenated workspace payloads.
pub const FAKE_CARGO_OK: &str = "#!/bin/sh\n\
if [ \"$1\" = \"--version\" ]; then echo \"cargo 9.9.9-fake\"; exit 0; fi\n\
mkdir -p target/release\n\
cat progA.bin progB.bin > target/release/bound\n\
exit 0\n";

/// Fake cargo that fails every build.
pub const FAKE_CARGO_FAIL: &str = "#!/bin/sh\n\
if [ \"$1\" = \"--version\" ]; then echo \"cargo 9.9.9-fake\"; exit 0; fi\n\
echo \"error: could not compile\" >&2\n\
exit 3\n";

/// Fake cargo that succeeds without producing anything.
pub const FAKE_CARGO_NO_ARTIFACT: &str = "#!/bin/sh\n\
if [ \"$1\" = \"--version\" ]; then echo \"cargo 9.9.9-fake\"; exit 0; fi\n\
exit 0\n";
