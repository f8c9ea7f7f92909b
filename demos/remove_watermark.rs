//! Remove the Gemini overlay from one image and write the result as PNG.
//!
//! Usage:
//! ```sh
//! cargo run --example remove_watermark -- input.jpg output.png
//! ```

use std::env;
use std::process;

use gemini_unblend::{UnblendOutcome, WatermarkEngine};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <input> <output.png>", args[0]);
        process::exit(1);
    }

    let input = match std::fs::read(&args[1]) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let engine = WatermarkEngine::new();
    match engine.remove_watermark_with_outcome(&input) {
        Ok((png, outcome)) => {
            if let Err(e) = std::fs::write(&args[2], png) {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            match outcome {
                UnblendOutcome::Applied { pixels } => println!("Done: {pixels} pixels restored"),
                _ => println!("Skipped: image too small for the overlay, copied unchanged"),
            }
        }
        Err(e) => {
            eprintln!("Processing failed: {e}");
            process::exit(1);
        }
    }
}
