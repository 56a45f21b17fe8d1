//! Build metadata baked in at compile time.
//!
//! The values come from `build.rs` via `VETTER_*` environment variables
//! and fall back to `"unknown"` when a build host cannot supply them
//! (no git checkout, no rustc on PATH).

pub const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BUILD_COMMIT: &str = match option_env!("VETTER_COMMIT_SHA") {
    Some(v) => v,
    None => "unknown",
};

pub const BUILD_DATE: &str = match option_env!("VETTER_BUILD_DATE") {
    Some(v) => v,
    None => "unknown",
};

pub const RUSTC_VERSION: &str = match option_env!("VETTER_RUSTC_VERSION") {
    Some(v) => v,
    None => "unknown",
};

/// The line printed by `vetter --version`.
pub fn version() -> String {
    format!(
        "vetter {} (commit {}, {}, rustc {})",
        PACKAGE_VERSION, BUILD_COMMIT, BUILD_DATE, RUSTC_VERSION
    )
}
