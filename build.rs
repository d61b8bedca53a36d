// Build script to extract version from Cargo.toml
// and optionally override patch version from CI/CD pipeline

use std::env;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").expect("CARGO_PKG_VERSION not set");

    let parts: Vec<&str> = version.split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        panic!("Invalid version format in Cargo.toml: {}", version);
    };

    // Release builds stamp their own patch number
    let final_patch =
        env::var("FETCH_AGENT_PATCH_VERSION").unwrap_or_else(|_| patch.to_string());

    println!(
        "cargo:rustc-env=FETCH_AGENT_VERSION={}.{}.{}",
        major, minor, final_patch
    );

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=FETCH_AGENT_PATCH_VERSION");
}
