//! Bundled demo dataset

use rust_embed::RustEmbed;

use crate::core::constants::DEMO_DATASET_FILE;

#[derive(RustEmbed)]
#[folder = "demo/"]
struct DemoAssets;

/// Raw text of the demo access log, if it was bundled
pub fn dataset() -> Option<String> {
    DemoAssets::get(DEMO_DATASET_FILE).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}
