//! Stamps the binary version with the git commit it was built from.

use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=ABOOK_BUILD_COMMIT");

    let package = env!("CARGO_PKG_VERSION");
    let version = match build_commit() {
        Some(commit) => format!("{}+{}", package, commit),
        None => package.to_string(),
    };

    println!("cargo:rustc-env=ABOOK_VERSION={}", version);
}

/// Commit id from `ABOOK_BUILD_COMMIT`, else the short hash of `HEAD`.
fn build_commit() -> Option<String> {
    if let Ok(commit) = std::env::var("ABOOK_BUILD_COMMIT") {
        let commit = commit.trim().to_string();
        return (!commit.is_empty()).then_some(commit);
    }

    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    (!hash.is_empty()).then(|| hash.to_string())
}
