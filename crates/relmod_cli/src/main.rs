//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `relmod_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use relmod_core::{load_modifier, LoadContext, LoaderOptions, ModifierEnv};
use serde_json::Value;

fn main() {
    println!("relmod_core version={}", relmod_core::core_version());

    let options =
        LoaderOptions::new().with("modifier", Value::String("identity".to_string()));
    match load_modifier(&LoadContext::new(options)) {
        Ok(Some(descriptor)) => {
            println!(
                "builtin modifier name={} probe={}",
                descriptor.name,
                descriptor.version.apply(&ModifierEnv::default(), "1.2.3")
            );
        }
        Ok(None) => println!("no modifier configured"),
        Err(err) => eprintln!("modifier load failed: {err}"),
    }
}
