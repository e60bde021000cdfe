// Injects CLINSCORE_VERSION from `git describe`, falling back to the crate version
// when git or tags are unavailable (e.g. building from a published tarball).

use std::process::Command;

fn main() {
    let version = git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=CLINSCORE_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}

/// `v1.2.0` -> `1.2.0`, `v1.2.0-5-gabc123` -> `1.2.0`, untagged `abc123` -> `<pkg>-abc123`
fn git_version() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();

    if let Some(tagged) = described.strip_prefix('v') {
        let release = tagged.split('-').next().unwrap_or(tagged);
        return Some(release.to_string());
    }

    let base = env!("CARGO_PKG_VERSION");
    Some(match described.strip_suffix("-dirty") {
        Some(commit) => format!("{}-{}-dirty", base, commit),
        None => format!("{}-{}", base, described),
    })
}
