use clap::{Parser, Subcommand};
use serde::Serialize;

use fincompare::api::{
    CarArgs, HousingArgs, ServeArgs, SettingsArgs, car_report, growth_report, housing_report,
    run_http_server,
};

#[derive(Parser, Debug)]
#[command(
    name = "fincompare",
    about = "Compare car financing (cash, lease, loan) and housing (buy, rent, rent and invest)"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "info",
        help = "Log filter used when RUST_LOG is unset"
    )]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the JSON API over HTTP
    Serve(ServeArgs),
    /// Compare paying cash, leasing and a loan for one car
    Car(CarArgs),
    /// Compare buying, renting, and renting while investing the difference
    Housing(HousingArgs),
    /// Print the compound-growth education series
    Growth(SettingsArgs),
}

fn print_json<T: Serialize>(result: Result<T, String>) -> Result<(), String> {
    let body = result?;
    let json = serde_json::to_string_pretty(&body).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = fincompare::telemetry::init(&cli.log_level) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let outcome = match cli.command {
        Command::Serve(args) => run_http_server(args)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Command::Car(args) => print_json(car_report(args)),
        Command::Housing(args) => print_json(housing_report(args)),
        Command::Growth(args) => print_json(growth_report(args)),
    };

    if let Err(e) = outcome {
        tracing::error!(error = %e, "command failed");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
