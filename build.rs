fn main() {
    // Re-run if git HEAD changes (new commits, checkouts, etc.)
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let git = |args: &[&str]| {
        std::process::Command::new("git")
            .args(args)
            .output()
            .ok()
            .filter(|o| o.status.success())
    };

    let on_tag = git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some();
    let hash = git(&["rev-parse", "--short", "HEAD"])
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    // Release builds report the package version, everything else the commit.
    let version = match (on_tag, hash.as_str()) {
        (true, _) => env!("CARGO_PKG_VERSION").to_string(),
        (false, "") => "dev@unknown".to_string(),
        (false, hash) => format!("dev@{hash}"),
    };
    println!("cargo:rustc-env=BROADSHEET_VERSION={version}");
}
