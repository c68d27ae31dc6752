//! Generate one image from a text prompt on a RunPod serverless endpoint.
//!
//! Requires RUNPOD_API_KEY and RUNPOD_ENDPOINT_ID in the environment.
//!
//! ```sh
//! cargo run --example generate -- "a lighthouse in a storm"
//! ```
//!
//! Press Ctrl-C while the job is running to cancel it.

use runpod_txt2img::{Generator, RunpodConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.is_empty() {
        eprintln!("Usage: cargo run --example generate -- \"<prompt>\"");
        return Ok(());
    }

    let config = RunpodConfig::from_env()?;
    let session = Generator::runpod(config);

    // Ctrl-C plays the cancel button.
    let cancel_handle = session.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nCancelling...");
            cancel_handle.cancel();
        }
    });

    println!("Generating: {}", prompt);
    match session.generate(&prompt).await {
        Ok(Some(image)) => {
            std::fs::write("output.png", image.bytes())?;
            println!("Saved: output.png ({} bytes)", image.bytes().len());
        }
        Ok(None) => {
            // Cancelled; the session holds the notice.
            if let Some(notice) = session.state().message {
                println!("{}", notice);
            }
        }
        Err(e) => eprintln!("Generation failed: {}", e),
    }

    Ok(())
}
