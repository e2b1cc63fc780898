//! Stamps the version shown by `questctl --version` and the status header.
//!
//! `QUESTCTL_VERSION` in the build environment overrides the package version.

const VERSION_VAR: &str = "QUESTCTL_VERSION";

fn main() {
    let version = match std::env::var(VERSION_VAR) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("cargo:rustc-env={}={}", VERSION_VAR, version);
    println!("cargo:rerun-if-env-changed={}", VERSION_VAR);
}
