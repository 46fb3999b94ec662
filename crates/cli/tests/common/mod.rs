//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const LOADER_MANIFEST: &str =
    "[package]\nname = \"bound\"\nversion = \"0.1.0\"\nedition = \"2021\"\n";

/// Fake cargo: answers `--version`, otherwise leaves `target/release/bound`
/// holding the concatenated workspace payloads.
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

/// Scratch layout for one CLI run.
pub struct CliEnv {
    pub temp: TempDir,
    pub loader_dir: PathBuf,
    pub workspaces_dir: PathBuf,
}

impl CliEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("tempdir");
        let loader_dir = temp.path().join("loader");
        let workspaces_dir = temp.path().join("workspaces");
        std::fs::create_dir_all(&loader_dir).expect("create loader dir");
        std::fs::create_dir_all(&workspaces_dir).expect("create workspaces dir");
        std::fs::write(loader_dir.join("Cargo.toml"), LOADER_MANIFEST).expect("write manifest");
        std::fs::write(
            loader_dir.join("main.rs.tpl"),
            "// {{ prog_a }} {{ prog_b }}\nfn main() {}\n",
        )
        .expect("write template");
        Self { temp, loader_dir, workspaces_dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, bytes).expect("write file");
        path
    }

    pub fn workspace_count(&self) -> usize {
        std::fs::read_dir(&self.workspaces_dir).expect("read workspaces dir").count()
    }
}

/// Write an executable script and wait until it can be executed.
///
/// A fork on another test thread may briefly hold the write descriptor, which
/// makes exec fail with ETXTBSY until it lets go.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, body).expect("write script");
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
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
