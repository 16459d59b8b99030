mod app;

use tracing::{error, info};

fn main() {
    app::init_tracing();
    info!("=== Platformer Startup ===");

    let summary = app::Settings::from_env().and_then(|settings| app::run(&settings));
    let summary = match summary {
        Ok(summary) => summary,
        Err(err) => {
            error!(error = %err, "platformer_failed");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            error!(error = %err, "summary_encode_failed");
            std::process::exit(1);
        }
    }
}
