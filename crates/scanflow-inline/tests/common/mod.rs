/// Shared helpers for the inline trigger tests
use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub fn load_event<T: DeserializeOwned>(name: &str) -> T {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let payload = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {}", path.display(), e));

    serde_json::from_str(&payload)
        .unwrap_or_else(|e| panic!("cannot parse fixture {}: {}", path.display(), e))
}
