use regex::Regex;
use std::process::Command;

fn main() {
    let mut shell_build = get_version().unwrap_or(format!("{}-unknown", env!("CARGO_PKG_VERSION")));

    if std::env::var("GITHUB_ACTIONS").is_ok() {
        shell_build = format!("{} (CI)", &shell_build);
    }

    println!("cargo:rustc-env=OVERLAY_SHELL_BUILD={}", &shell_build);
}

fn get_version() -> Result<String, Box<dyn std::error::Error>> {
    let re = Regex::new(r"v([0-9.]+)-([0-9]+)-g([a-f0-9]+)")?;
    let output = Command::new("git")
        .args(["describe", "--tags", "--abbrev=7", "--dirty"])
        .output()?;

    let output_str = String::from_utf8(output.stdout)?;
    let output_str = output_str.trim();

    if output_str.is_empty() {
        return Err("no tags".into());
    }

    Ok(re.replace_all(output_str, "${1}.r${2}.${3}").into_owned())
}
