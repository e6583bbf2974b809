use std::env;
use std::fs;
use std::process::Command;

fn main() {
    // VERSION file overrides the manifest version when present
    let version = fs::read_to_string("VERSION")
        .map(|s| s.trim().to_string())
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| env::var("CARGO_PKG_VERSION").ok())
        .unwrap_or_else(|| "0.0.0".to_string());

    // Set by CI; local builds report "local"
    let build = env::var("BUILD_NUMBER").unwrap_or_else(|_| "local".to_string());

    let profile = match env::var("PROFILE").as_deref() {
        Ok("release") => "release",
        _ => "development",
    };

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=AONT_VERSION={}", version);
    println!("cargo:rustc-env=AONT_BUILD={}", build);
    println!("cargo:rustc-env=AONT_PROFILE={}", profile);
    println!("cargo:rustc-env=AONT_GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=VERSION");
    println!("cargo:rerun-if-env-changed=BUILD_NUMBER");
    println!("cargo:rerun-if-env-changed=PROFILE");
}
