use std::process::Command;

const VERSION_VAR: &str = "PORTFOLIO_SHELL_BUILD_VERSION";

/// Version from `git describe`, without the leading `v` of a release tag
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8_lossy(&output.stdout);
    let described = described.trim();
    let described = described.strip_prefix('v').unwrap_or(described);
    (!described.is_empty()).then(|| described.to_string())
}

fn main() {
    println!("cargo:rerun-if-env-changed={VERSION_VAR}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    // An explicit override wins, then git, then the manifest version
    let version = std::env::var(VERSION_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(git_describe)
        .or_else(|| std::env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_default();

    println!("cargo:rustc-env={VERSION_VAR}={version}");
}
