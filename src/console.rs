//! Colorful console output for service startup and simulation runs.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::net::SocketAddr;
use std::time::Duration;

use crate::simulation::SimulationReport;

/// Endpoints listed in the startup banner.
const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/health", "Health check"),
    ("GET", "/info", "Service info"),
    ("POST", "/optimize", "Select a carrier for one shipment"),
    ("GET", "/optimize/demo", "Demo selection on reference data"),
    ("GET", "/entities", "List supply-chain participants"),
    ("POST", "/freshness/calculate", "Freshness on arrival"),
    ("POST", "/risk/calculate", "Risk level of a leg"),
    ("POST", "/distance/calculate", "Great-circle distance"),
    ("POST", "/simulate", "Optimized vs. first-carrier comparison"),
    ("GET", "/simulate/stream", "Same comparison as Server-Sent Events"),
    ("GET", "/q/swagger-ui", "OpenAPI explorer"),
];

/// ASCII banner with version and endpoint list.
pub fn print_banner(addr: SocketAddr) {
    let banner = r#"
  ___         _    _        _    _       ___          _   _
 | _ \___ _ _(_)__| |_  __ _| |__| |___  | _ \___ _  _| |_(_)_ _  __ _
 |  _/ -_) '_| (_-< ' \/ _` | '_ \ / -_) |   / _ \ || |  _| | ' \/ _` |
 |_| \___|_| |_/__/_||_\__,_|_.__/_\___| |_|_\___/\_,_|\__|_|_||_\__, |
                                                                 |___/
"#;
    println!("{}", banner.green().bold());
    println!(
        "  {} {}\n",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "Cold-chain transport selection".bright_green()
    );
    for (method, path, description) in ENDPOINTS {
        println!(
            "  {:<5} {:<22} {}",
            method.bright_yellow(),
            path.white().bold(),
            description.bright_black()
        );
    }
    println!();
    println!(
        "{} {} Server listening on {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("http://{}", addr).bright_cyan()
    );
}

/// Prints a boxed summary of a simulation run.
pub fn print_simulation_summary(report: &SimulationReport, elapsed: Duration) {
    let orders_per_sec = if elapsed.as_secs_f64() > 0.0 {
        (report.num_orders_simulated as f64 / elapsed.as_secs_f64()) as u64
    } else {
        0
    };

    println!(
        "{} {} {} Simulation ended: orders ({}), feasible ({}), time spent ({}), speed ({}/sec)",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Simulation]".bright_cyan(),
        report.num_orders_simulated.to_formatted_string(&Locale::en).bright_yellow(),
        report.optimized_feasible_orders.to_formatted_string(&Locale::en).bright_yellow(),
        format_duration(elapsed).yellow(),
        orders_per_sec.to_formatted_string(&Locale::en).bright_magenta().bold()
    );

    // 60 chars wide, 56 char content area
    println!("{}", "╔══════════════════════════════════════════════════════════╗".bright_cyan());
    let rows = [
        ("Cost savings:", format!("{:.2}%", report.savings.cost_savings_percent)),
        ("Time savings:", format!("{:.2}%", report.savings.time_savings_percent)),
        (
            "Freshness gain:",
            format!("{:+.2} pts", report.savings.freshness_improvement_percent),
        ),
        (
            "Optimized cost:",
            format!("{:.2}", report.optimized_results.total_cost),
        ),
        (
            "Baseline cost:",
            format!("{:.2}", report.baseline_results.total_cost),
        ),
    ];
    for (label, value) in rows {
        println!(
            "{}  {:<18}{:>36}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        );
    }
    println!("{}", "╚══════════════════════════════════════════════════════════╝".bright_cyan());
}

/// Formats a duration nicely.
fn format_duration(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Returns a timestamp string.
fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
