mod completions;
mod distro;
mod pkgmgr;
mod sysinfo;
mod ui;

use std::io::{self, Write};
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use crate::distro::{Distro, Family};
use crate::pkgmgr::{ExecutionOptions, Outcome, PackageGuide};
use crate::sysinfo::wifi::{self, WifiStatus};

/// tuxpal main parser
#[derive(Parser, Debug)]
#[command(
    name = "tuxpal",
    version,
    about = "Friendly helper for Linux newcomers",
    long_about = "tuxpal explains what your system is doing\nand shows the native commands behind each action."
)]
struct Cli {
    /// Show commands before running them and ask for confirmation
    #[arg(
        long,
        global = true,
        default_value_t = true,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    dry_run: bool,

    /// Assume yes for package operations
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,

    /// Explain what tuxpal is doing and show native commands
    #[arg(long, global = true)]
    explain: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect the Linux distribution
    Detect,

    /// Update installed packages
    Update,

    /// Install packages
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Remove packages
    Remove {
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Search for packages
    Search { query: String },

    /// Show details about a package
    Info { name: String },

    /// Show system information
    Sys {
        #[command(subcommand)]
        command: Option<SysCommands>,
    },

    /// Show tuxpal version information
    Version,

    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Subcommand, Debug)]
enum SysCommands {
    /// Show network interfaces, routes and DNS
    Net,
    /// Show wireless connection details and helpful hints
    Wifi,
}

fn main() {
    let cli = Cli::parse();
    let opts = ExecutionOptions {
        dry_run: cli.dry_run,
        assume_yes: cli.assume_yes,
        explain: cli.explain,
    };

    if let Err(err) = run(&cli, opts) {
        eprintln!("{} {err:#}", ui::error("Error:"));
        process::exit(1);
    }
}

fn run(cli: &Cli, opts: ExecutionOptions) -> Result<()> {
    match &cli.command {
        Commands::Detect => cmd_detect(),
        Commands::Update => cmd_update(opts),
        Commands::Install { packages } => cmd_install(packages, opts),
        Commands::Remove { packages } => cmd_remove(packages, opts),
        Commands::Search { query } => cmd_search(query, opts),
        Commands::Info { name } => cmd_info(name, opts),
        Commands::Sys { command: None } => {
            cmd_sys();
            Ok(())
        }
        Commands::Sys {
            command: Some(SysCommands::Net),
        } => {
            cmd_sys_net();
            Ok(())
        }
        Commands::Sys {
            command: Some(SysCommands::Wifi),
        } => {
            cmd_sys_wifi();
            Ok(())
        }
        Commands::Version => {
            cmd_version();
            Ok(())
        }
        Commands::Completions { shell } => {
            completions::generate_completions(*shell, &mut Cli::command());
            Ok(())
        }
    }
}

fn detect_distro() -> Result<Distro> {
    distro::detect().context("could not detect distribution")
}

fn cmd_detect() -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Detected Linux distribution"));
    println!("  {} {}", ui::key("ID        :"), ui::value(&d.id));
    println!("  {} {}", ui::key("ID_LIKE   :"), d.id_like.join(" "));
    println!("  {} {}", ui::key("NAME      :"), ui::value(&d.name));
    println!("  {} {}", ui::key("PRETTY    :"), ui::value(&d.pretty_name));
    println!("  {} {}", ui::key("VERSION   :"), ui::value(&d.version_id));
    println!("  {} {}", ui::key("FAMILY    :"), ui::value(d.family.as_str()));
    if matches!(d.family, Family::Suse | Family::Other) {
        println!();
        println!(
            "{}",
            ui::warning("Package operations are not supported for this distribution yet.")
        );
    }
    Ok(())
}

fn cmd_update(opts: ExecutionOptions) -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Update packages"));
    println!(
        "  {} {}",
        ui::key("Distro family:"),
        ui::value(d.family.as_str())
    );
    println!();

    let mut guide = PackageGuide::new(&d);
    let outcome = guide.update_all(opts)?;
    finish(outcome, "Update finished", "Update did not complete successfully")
}

fn cmd_install(packages: &[String], opts: ExecutionOptions) -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Install packages"));
    println!(
        "  {} {}",
        ui::key("Distro family:"),
        ui::value(d.family.as_str())
    );
    println!("  {} {}", ui::key("Packages     :"), packages.join(" "));
    println!();

    let mut guide = PackageGuide::new(&d);
    let outcome = guide.install(packages, opts)?;
    finish(
        outcome,
        "Install finished",
        "Package install did not complete successfully",
    )
}

fn cmd_remove(packages: &[String], opts: ExecutionOptions) -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Remove packages"));
    println!(
        "  {} {}",
        ui::key("Distro family:"),
        ui::value(d.family.as_str())
    );
    println!("  {} {}", ui::key("Packages     :"), packages.join(" "));
    println!();

    let mut guide = PackageGuide::new(&d);
    let outcome = guide.remove(packages, opts)?;
    finish(
        outcome,
        "Remove finished",
        "Package removal did not complete successfully",
    )
}

fn cmd_search(query: &str, opts: ExecutionOptions) -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Search packages"));
    println!("  {} {}", ui::key("Query:"), ui::value(query));
    println!();

    let mut guide = PackageGuide::new(&d);
    let outcome = guide.search(query, opts)?;
    finish(outcome, "Search finished", "Search did not complete successfully")
}

fn cmd_info(name: &str, opts: ExecutionOptions) -> Result<()> {
    let d = detect_distro()?;
    println!("{}", ui::heading("Package details"));
    println!("  {} {}", ui::key("Package:"), ui::value(name));
    println!();

    let mut guide = PackageGuide::new(&d);
    let outcome = guide.info(name, opts)?;
    finish(
        outcome,
        "Info finished",
        "Info lookup did not complete successfully",
    )
}

/// Map an execution outcome to operator feedback and an exit code.
/// Cancellation exits cleanly; only genuine failures exit non-zero.
fn finish(outcome: Outcome, success: &str, failure: &str) -> Result<()> {
    match outcome {
        Outcome::Completed => {
            println!("{}", ui::success(success));
            Ok(())
        }
        Outcome::Canceled => Ok(()),
        Outcome::Failed(cause) => {
            eprintln!();
            eprintln!("{}", ui::error(failure));
            eprintln!("{}", ui::muted("The package manager output above has the detail"));
            eprintln!("  {cause}");
            process::exit(1);
        }
    }
}

fn cmd_sys() {
    let summary = sysinfo::summary();
    println!("{}", ui::heading("System summary"));
    println!("  {} {}", ui::key("Hostname     :"), ui::value(&summary.hostname));
    println!(
        "  {} {}",
        ui::key("Distribution :"),
        ui::value(&summary.distro_name)
    );
    println!("  {} {}", ui::key("Kernel       :"), ui::value(&summary.kernel));
    println!("  {} {}", ui::key("Uptime       :"), ui::value(&summary.uptime));
    println!(
        "  {} {}",
        ui::key("Load average :"),
        ui::value(&summary.load_average)
    );
    println!("  {} {}", ui::key("Memory usage :"), ui::value(&summary.memory));
}

fn cmd_sys_net() {
    println!("{}", ui::heading("Network interfaces"));
    let interfaces = sysinfo::net::interfaces();
    if interfaces.is_empty() {
        println!("  {}", ui::muted("No interfaces found"));
    }
    for iface in interfaces {
        println!(
            "  {} {}",
            ui::key(&format!("{:12}", iface.name)),
            ui::muted(&format!("[{}]", iface.oper_state))
        );
        for addr in &iface.addresses {
            println!("      {}", ui::value(addr));
        }
    }

    if let Some(route) = sysinfo::net::default_route() {
        println!();
        println!("{}", ui::heading("Default route"));
        if let Some(dev) = &route.interface {
            println!("  {} {}", ui::key("Interface:"), ui::value(dev));
        }
        if let Some(gw) = &route.gateway {
            println!("  {} {}", ui::key("Gateway  :"), ui::value(gw));
        }
    }

    let dns = sysinfo::net::dns_servers();
    if !dns.is_empty() {
        println!();
        println!("{}", ui::heading("DNS servers"));
        for server in dns {
            println!("  {}", ui::value(&server));
        }
    }
}

fn cmd_sys_wifi() {
    let Some(status) = wifi::status() else {
        println!("{}", ui::error("WiFi info could not be determined"));
        println!(
            "{}",
            ui::muted("You may need NetworkManager or wireless tools installed")
        );
        return;
    };

    print_wifi_info(&status);

    println!();
    print!(
        "{} [y/N]: ",
        ui::info("Run a quick latency and packet loss test to 8.8.8.8")
    );
    let _ = io::stdout().flush();
    let mut answer = String::new();
    let _ = io::stdin().read_line(&mut answer);

    if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
        println!();
        match wifi::latency_test() {
            Some((avg_ms, loss_pct)) => {
                print_latency_info(avg_ms, loss_pct);
                println!();
                print_wifi_suggestions(&status, avg_ms, loss_pct);
                return;
            }
            None => println!("{}", ui::error("Latency test failed")),
        }
    }

    println!();
    print_wifi_suggestions(&status, 0.0, 0.0);
}

fn print_wifi_info(s: &WifiStatus) {
    println!("{}", ui::heading("WiFi connection"));
    println!("  {} {}", ui::key("Device   :"), ui::value(&s.device));
    let ssid = if s.ssid.trim().is_empty() {
        "(unknown)"
    } else {
        &s.ssid
    };
    println!("  {} {}", ui::key("SSID     :"), ui::value(ssid));

    if s.signal_percent > 0 {
        println!(
            "  {} {} {}",
            ui::key("Signal   :"),
            colored_signal(s.signal_percent),
            ui::muted(&format!("({})", wifi::signal_quality_label(s.signal_percent)))
        );
    } else if !s.quality_text.trim().is_empty() {
        println!("  {} {}", ui::key("Signal   :"), s.quality_text);
    }

    if let Some(band) = s.band {
        println!("  {} {}", ui::key("Band     :"), band.label());
    }
    if s.channel > 0 {
        match wifi::channel_hint(s.band, s.channel) {
            Some(hint) => println!(
                "  {} {} {}",
                ui::key("Channel  :"),
                s.channel,
                ui::muted(hint)
            ),
            None => println!("  {} {}", ui::key("Channel  :"), s.channel),
        }
    }
    if !s.frequency_raw.is_empty() {
        println!("  {} {}", ui::key("Frequency:"), s.frequency_raw);
    }
    if !s.rate_raw.is_empty() {
        let mut line = format!("  {} {}", ui::key("Link speed:"), s.rate_raw);
        if s.rate_raw.contains("Mbit") || s.rate_raw.contains("Mbps") {
            line.push(' ');
            line.push_str(&ui::muted("(WiFi link speed, not actual internet speed)"));
        }
        println!("{line}");
    }
    if !s.security_raw.is_empty() {
        println!(
            "  {} {}",
            ui::key("Security :"),
            describe_security(&s.security_raw)
        );
    }
}

fn colored_signal(value: i32) -> String {
    let text = format!("{value} percent");
    match value {
        70.. => text.green().to_string(),
        40..70 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

fn describe_security(sec: &str) -> String {
    if sec.is_empty() || sec == "--" {
        return ui::error("Open (no password, not secure)");
    }
    let note = if sec.contains("WPA3") {
        " (modern and strong)"
    } else if sec.contains("WPA2") {
        " (good security for most networks)"
    } else if sec.contains("WEP") {
        " (very weak, should be avoided)"
    } else {
        " (unknown style)"
    };
    format!("{sec}{note}")
}

fn print_latency_info(avg_ms: f64, loss_pct: f64) {
    println!("{}", ui::heading("Latency test (ping 8.8.8.8)"));

    let avg_text = format!("{avg_ms:.1} ms");
    let avg_colored = if avg_ms <= 40.0 {
        avg_text.green()
    } else if avg_ms <= 80.0 {
        avg_text.yellow()
    } else {
        avg_text.red()
    };

    let loss_text = format!("{loss_pct:.1}%");
    let loss_colored = if loss_pct >= 5.0 {
        loss_text.red()
    } else if loss_pct > 0.0 {
        loss_text.yellow()
    } else {
        loss_text.green()
    };

    println!("  {} {}", ui::key("Average:"), avg_colored);
    println!("  {} {}", ui::key("Loss   :"), loss_colored);
}

fn print_wifi_suggestions(s: &WifiStatus, avg_ms: f64, loss_pct: f64) {
    println!("{}", ui::heading("Suggestions"));
    let lines = wifi::suggestions(
        s.signal_percent,
        s.band,
        s.channel,
        &s.security_raw,
        avg_ms,
        loss_pct,
    );
    for line in lines {
        if line.is_empty() {
            println!();
        } else {
            println!("  {line}");
        }
    }
}

fn cmd_version() {
    println!("{}", ui::heading("tuxpal version"));
    println!("Version: {}", ui::value(env!("CARGO_PKG_VERSION")));
    println!(
        "Commit : {}",
        ui::value(option_env!("TUXPAL_COMMIT").unwrap_or("none"))
    );
    println!(
        "Built  : {}",
        ui::value(option_env!("TUXPAL_BUILD_DATE").unwrap_or("unknown"))
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn dry_run_defaults_on_and_can_be_disabled() {
        let cli = Cli::parse_from(["tuxpal", "update"]);
        assert!(cli.dry_run);

        let cli = Cli::parse_from(["tuxpal", "update", "--dry-run=false"]);
        assert!(!cli.dry_run);

        let cli = Cli::parse_from(["tuxpal", "install", "htop", "--yes", "--explain"]);
        assert!(cli.assume_yes);
        assert!(cli.explain);
        assert!(cli.dry_run);
    }

    #[test]
    fn sys_subcommands_parse() {
        let cli = Cli::parse_from(["tuxpal", "sys", "wifi"]);
        assert!(matches!(
            cli.command,
            Commands::Sys {
                command: Some(SysCommands::Wifi)
            }
        ));

        let cli = Cli::parse_from(["tuxpal", "version"]);
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn install_requires_at_least_one_package() {
        assert!(Cli::try_parse_from(["tuxpal", "install"]).is_err());
        assert!(Cli::try_parse_from(["tuxpal", "remove"]).is_err());
    }
}
