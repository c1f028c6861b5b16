use aegis_runner::{MarketSimulation, load_config, load_default_config};
use log::info;

fn print_help() {
    eprintln!(
        r#"Aegis Runner - price monitoring market simulation

USAGE:
    aegis-runner [OPTIONS]

OPTIONS:
    --config <PATH>     Load simulation configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Run with the embedded defaults
    aegis-runner

    # Run with config file
    aegis-runner --config simulation.json
"#
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                }
                config_path = Some(args[i].clone());
            }
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let config = if let Some(path) = config_path {
        info!("Loading configuration from: {}", path);
        load_config(&path)?
    } else {
        info!("Using default configuration");
        load_default_config()?
    };

    let results = MarketSimulation::new(config)?.run().await?;
    println!("{}", serde_json::to_string_pretty(&results)?);

    Ok(())
}
