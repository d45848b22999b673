//! content-export
//!
//! Exports headless-CMS content to Excel workbooks or zipped CSV files.
//!
//! # Usage
//!
//! ```bash
//! content-export -e <ENVIRONMENT_ID> -k <API_KEY> export \
//!     -t article -l en-US -w published -f excel
//! ```

use tracing::Level;

use content_export::cli::CliInterface;
use content_export::formatter::Colorizer;

/// Application entry point
#[tokio::main]
async fn main() {
    let cli = match CliInterface::new() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", Colorizer::new(true).error(&e.to_string()));
            std::process::exit(1);
        }
    };

    initialize_logging(cli.log_level(), cli.config().logging.timestamps);

    let code = match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", cli.colorizer().error(&e.to_string()));
            1
        }
    };

    std::process::exit(code);
}

/// Initialize logging system
///
/// # Arguments
/// * `level` - Maximum level after verbosity flags
/// * `timestamps` - Prefix lines with a timestamp
fn initialize_logging(level: Level, timestamps: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
