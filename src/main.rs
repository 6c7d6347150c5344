// Entry point and high-level CLI flow.
//
// - Option [1] loads the exhibition form JSON exported by the wizard.
// - Option [2] computes the estimate, prints the itemized breakdown and
//   writes a CSV line-item sheet plus a JSON quote summary.
// - After generating, the user can go back to the menu or exit.
use expo_estimator::{estimate_with, output, report, util, CalculatorInput, RateTables};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FORM_PATH: &str = "exhibition_form.json";
const BREAKDOWN_CSV: &str = "estimate_breakdown.csv";
const SUMMARY_JSON: &str = "estimate_summary.json";

// Loaded once per run; estimates can be regenerated without reloading.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        form: None,
        rates: load_rates(),
    })
});

struct AppState {
    form: Option<CalculatorInput>,
    rates: RateTables,
}

/// The built-in rate card unless `EXPO_RATE_TABLE` points at a JSON override.
fn load_rates() -> RateTables {
    match std::env::var("EXPO_RATE_TABLE") {
        Ok(path) => match RateTables::from_path(&path) {
            Ok(tables) => {
                info!(%path, "loaded rate table");
                tables
            }
            Err(e) => {
                warn!(%path, error = %e, "could not load rate table, using built-in rates");
                RateTables::default()
            }
        },
        Err(_) => RateTables::default(),
    }
}

fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn load_form(path: &str) -> Result<CalculatorInput, expo_estimator::EstimateError> {
    let s = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&s)?)
}

/// Handle option [1]: load the wizard form state.
fn handle_load() {
    let path = std::env::var("EXPO_FORM_PATH").unwrap_or_else(|_| DEFAULT_FORM_PATH.to_string());
    match load_form(&path) {
        Ok(form) => {
            info!(%path, "loaded exhibition form");
            println!(
                "Loaded form for {} ({} team members).\n",
                form.destination_city.as_deref().unwrap_or("unspecified city"),
                form.team_size
                    .as_ref()
                    .and_then(|t| t.as_f64())
                    .map(|t| util::format_number(t, 0))
                    .unwrap_or_else(|| "0".to_string())
            );
            let mut state = match APP_STATE.lock() {
                Ok(state) => state,
                Err(poisoned) => poisoned.into_inner(),
            };
            state.form = Some(form);
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", path, e);
        }
    }
}

/// Handle option [2]: compute, print and export the estimate.
fn handle_generate_estimate() {
    let state = match APP_STATE.lock() {
        Ok(state) => state,
        Err(poisoned) => poisoned.into_inner(),
    };
    let Some(form) = state.form.as_ref() else {
        println!("Error: No form loaded. Please load the form first (option 1).\n");
        return;
    };

    let estimate = match estimate_with(&state.rates, form, None) {
        Ok(e) => e,
        Err(e) if e.is_validation() => {
            eprintln!("Please fix the form: {}\n", e);
            return;
        }
        Err(e) => {
            eprintln!("Cannot estimate: {}\n", e);
            return;
        }
    };

    let rows = report::estimate_line_items(&estimate);
    println!("Exhibition Cost Estimate ({})\n", estimate.breakdown.currency);
    output::preview_table_rows(&rows, rows.len());

    if let Err(e) = output::write_csv(BREAKDOWN_CSV, &rows) {
        eprintln!("Write error: {}", e);
    }
    let summary = report::quote_summary(&estimate);
    if let Err(e) = output::write_json(SUMMARY_JSON, &summary) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "({} line items exported to {}, summary to {})\n",
        util::format_int(rows.len()),
        BREAKDOWN_CSV,
        SUMMARY_JSON
    );
    println!(
        "Total: {} {} ({} per sqm)\n",
        estimate.breakdown.currency,
        util::format_amount(estimate.breakdown.total as f64, 0, &estimate.breakdown.currency),
        util::format_amount(estimate.result.totals.cost_per_sqm, 2, &estimate.breakdown.currency)
    );
}

fn main() {
    // Logs go to stderr so the menu and tables on stdout stay readable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,expo_estimator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    loop {
        println!("Exhibition Cost Estimator");
        println!("[1] Load exhibition form");
        println!("[2] Generate estimate\n");
        match read_choice().as_str() {
            "1" => handle_load(),
            "2" => {
                println!();
                handle_generate_estimate();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
