//! Build script for artistfolio.
//!
//! Copies the `.env.example` template into the local data directory so users
//! find it next to where the `.env` file is read from:
//! - Linux: `~/.local/share/artistfolio/.env.example`
//! - macOS: `~/Library/Application Support/artistfolio/.env.example`
//! - Windows: `%LOCALAPPDATA%/artistfolio/.env.example`
//!
//! Failures only produce cargo warnings.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("artistfolio");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    // Read-only home directories (CI, sandboxes) must not break the build.
    let copied = fs::create_dir_all(&out_dir)
        .and_then(|_| fs::copy(&env_example_path, out_dir.join(".env.example")));
    if let Err(e) = copied {
        println!(
            "cargo:warning=could not copy .env.example to {}: {}",
            out_dir.display(),
            e
        );
    }

    Ok(())
}
