use std::path::Path;
use std::process::Command;

fn git(repo: &Path, args: &[&str]) -> Option<String> {
    let out = Command::new("git").arg("-C").arg(repo).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Short commit of the workspace, `+dirty` when the tree has local edits.
fn build_id(repo: &Path) -> String {
    let Some(sha) = git(repo, &["rev-parse", "--short", "HEAD"]).filter(|s| !s.is_empty()) else {
        return "unknown".to_string();
    };
    match git(repo, &["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{sha}+dirty"),
        _ => sha,
    }
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");

    println!("cargo:rustc-env=FORECAST_BUILD_SHA={}", build_id(&workspace));
    for tracked in [".git/HEAD", ".git/index"] {
        println!("cargo:rerun-if-changed={}", workspace.join(tracked).display());
    }
}
