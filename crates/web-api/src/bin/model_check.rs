//! Manual smoke test: can the trained model artifact be loaded?
//!
//! Prints one of two message shapes to stdout and always exits cleanly.

use giclass_config::{ModelArtifact, DEFAULT_MODEL_PATH};

fn main() {
    match ModelArtifact::open(DEFAULT_MODEL_PATH) {
        Ok(artifact) => {
            println!("✅ Model loaded!");
            println!("Input shape: {}", artifact.input_shape);
        }
        Err(err) => println!("❌ Failed: {err}"),
    }
}
