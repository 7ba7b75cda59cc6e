fn main() {
    // Keys and endpoints may be baked in at build time; rebuild when they change.
    for key in [
        "HF_API_KEY",
        "YOUTUBE_API_KEY",
        "HF_INFERENCE_URL",
        "YOUTUBE_API_URL",
        "HF_IMAGE_MODEL",
        "HF_ZERO_SHOT_MODEL",
        "REQUEST_TIMEOUT_SECS",
        "TRANSPORT_RETRIES",
    ] {
        println!("cargo:rerun-if-env-changed={}", key);
    }
    tauri_build::build()
}
