use std::process::Command;

fn main() {
    // Embed git commit hash for `devtrack --version`
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-env-changed=DEVTRACK_GIT_HASH");

    // Release tarballs have no .git; packagers can pass the hash in
    let git_hash = std::env::var("DEVTRACK_GIT_HASH").ok().or_else(|| {
        Command::new("git")
            .args(["rev-parse", "--short=7", "HEAD"])
            .output()
            .ok()
            .filter(|output| output.status.success())
            .and_then(|output| String::from_utf8(output.stdout).ok())
            .map(|s| s.trim().to_string())
    });

    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", git_hash.as_deref().unwrap_or("unknown"));

    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={}", target);
}
