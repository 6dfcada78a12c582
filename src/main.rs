use anyhow::{Context, Result};
use chromeprofiles::{
    config::Config,
    model::{BrowserType, ScanReport, UserInfo},
    output::{format_report_to_string, print_report, OutputFormat},
    platform::{profile_root_suffixes, Platform},
    scan::scan_profiles,
    users,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chromeprofiles")]
#[command(
    author,
    version,
    about = "Inventory Chromium-family browser profiles and their installed extensions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan browser profiles and report their extensions
    Scan {
        /// Filter by browser (chrome, brave, chromium, yandex, edge, edge_beta, opera)
        #[arg(short, long)]
        browser: Option<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,

        /// Write output to file (always JSON)
        #[arg(short, long)]
        output: Option<String>,

        /// Scan every local user account instead of only the current one
        #[arg(long)]
        all_users: bool,

        /// Scan an explicit home directory, as PATH or UID:PATH (repeatable)
        #[arg(long, value_name = "HOME")]
        home: Vec<String>,

        /// Only report extensions referenced by a preferences document
        #[arg(long)]
        referenced_only: bool,

        /// Include a content-script match table in table output
        #[arg(long)]
        content_scripts: bool,
    },

    /// List supported browsers and their profile locations
    ListBrowsers,

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("chromeprofiles=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().unwrap_or_default();

    match cli.command {
        Commands::Scan {
            browser,
            format,
            output,
            all_users,
            home,
            referenced_only,
            content_scripts,
        } => {
            let format_str = format.unwrap_or_else(|| config.default_format.clone());
            let format = OutputFormat::from_str(&format_str).map_err(|e| anyhow::anyhow!(e))?;

            run_scan(
                &config,
                browser,
                format,
                output,
                all_users,
                &home,
                referenced_only,
                content_scripts,
            )
        }
        Commands::ListBrowsers => {
            list_browsers();
            Ok(())
        }
        Commands::Config { init, path } => handle_config(init, path),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    config: &Config,
    browser_filter: Option<String>,
    format: OutputFormat,
    output_file: Option<String>,
    all_users: bool,
    homes: &[String],
    referenced_only: bool,
    content_scripts: bool,
) -> Result<()> {
    let users = resolve_users(all_users, homes)?;

    let browsers: Vec<BrowserType> = match browser_filter {
        Some(name) => vec![name.parse().map_err(|e: String| anyhow::anyhow!(e))?],
        None => config.browsers.clone(),
    };
    let browser_filter = (!browsers.is_empty()).then_some(browsers.as_slice());

    let mut profiles = scan_profiles(&users, browser_filter);

    if referenced_only || !config.include_unreferenced {
        for profile in &mut profiles {
            profile.extensions.retain(|extension| extension.referenced);
        }
    }

    let report = ScanReport::new(profiles);

    if let Some(path) = output_file {
        let content = format_report_to_string(&report, format)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write output file: {}", path))?;
        if format == OutputFormat::Table {
            println!("Results written to: {}", path);
        }
    } else {
        print_report(&report, format, content_scripts)?;
    }

    Ok(())
}

/// Resolves the set of users to scan from the CLI flags.
fn resolve_users(all_users: bool, homes: &[String]) -> Result<Vec<UserInfo>> {
    if !homes.is_empty() {
        return homes.iter().map(|spec| parse_home(spec)).collect();
    }

    if all_users {
        return Ok(users::all_users());
    }

    users::current_user()
        .map(|user| vec![user])
        .context("Could not determine the current user's home directory")
}

/// Parses a `--home` value: either a bare path or `UID:PATH`.
///
/// A prefix is only treated as a uid when it parses as an integer, so
/// Windows drive paths like `C:\Users\x` pass through unchanged.
fn parse_home(spec: &str) -> Result<UserInfo> {
    if let Some((uid, path)) = spec.split_once(':') {
        if let Ok(uid) = uid.parse::<i64>() {
            return Ok(UserInfo {
                uid,
                home: PathBuf::from(path),
            });
        }
    }

    Ok(UserInfo {
        uid: 0,
        home: PathBuf::from(spec),
    })
}

fn list_browsers() {
    let suffixes = profile_root_suffixes(Platform::current());

    println!("Supported browsers:");
    println!();

    for browser in BrowserType::ALL {
        let roots: Vec<&str> = suffixes
            .iter()
            .filter(|(b, _)| b == browser)
            .map(|(_, suffix)| *suffix)
            .collect();

        if roots.is_empty() {
            println!(
                "  {:<12} {:<22} [not available on this platform]",
                browser.as_str(),
                browser.display_name()
            );
        } else {
            println!("  {:<12} {}", browser.as_str(), browser.display_name());
            for root in roots {
                println!("  {:<12} Location: ~/{}", "", root);
            }
        }
        println!();
    }
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'chromeprofiles config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
