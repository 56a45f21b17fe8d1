use std::process::Command;

/// Run a command and return its trimmed stdout, or None on any failure.
fn capture(cmd: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(cmd).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    Some(text.trim().to_string())
}

fn main() {
    let commit = capture("git", &["rev-parse", "--short", "HEAD"]);
    let date = capture("date", &["+%Y-%m-%d"]);
    // "rustc 1.92.0 (hash date)" -> "1.92.0"
    let rustc = capture("rustc", &["--version"])
        .and_then(|line| line.split_whitespace().nth(1).map(str::to_string));

    let fallback = || "unknown".to_string();
    println!(
        "cargo:rustc-env=VETTER_COMMIT_SHA={}",
        commit.unwrap_or_else(fallback)
    );
    println!(
        "cargo:rustc-env=VETTER_BUILD_DATE={}",
        date.unwrap_or_else(fallback)
    );
    println!(
        "cargo:rustc-env=VETTER_RUSTC_VERSION={}",
        rustc.unwrap_or_else(fallback)
    );

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=VETTER_COMMIT_SHA");
}
