use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=LLUVIA_BUILD");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let target = target_label();
    let build_id = std::env::var("LLUVIA_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| match short_sha() {
            Some(sha) => format!("{target}+{sha}"),
            None => target,
        });

    println!("cargo:rustc-env=LLUVIA_BUILD={}", build_id);
}

fn target_label() -> String {
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".to_string());
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let os = if os == "macos" {
        "darwin".to_string()
    } else {
        os
    };
    format!("{os}-{arch}")
}

fn short_sha() -> Option<String> {
    let from_git = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok());

    let raw = from_git.or_else(|| std::env::var("GITHUB_SHA").ok())?;
    let raw = raw.trim();
    let short = &raw[..raw.len().min(7)];
    if !short.is_empty() && short.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(short.to_ascii_lowercase())
    } else {
        None
    }
}
