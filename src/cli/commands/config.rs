//! `qcp config` command - Configuration management
//!
//! Provides commands to view and modify the quality limits, box capacity
//! and data directory.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., box_capacity, max_weight)
    pub key: String,

    /// Value to set (comma-separated for allowed_colors)
    pub value: String,

    /// Set in global (user) config instead of the data-directory config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of the data-directory config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys and their descriptions
const VALID_KEYS: &[(&str, &str)] = &[
    ("min_weight", "Minimum accepted weight in grams (inclusive)"),
    ("max_weight", "Maximum accepted weight in grams (inclusive)"),
    ("min_length", "Minimum accepted length in centimeters (inclusive)"),
    ("max_length", "Maximum accepted length in centimeters (inclusive)"),
    ("allowed_colors", "Accepted colors, comma-separated"),
    ("box_capacity", "Parts per box"),
    ("data_dir", "Data directory (global config only)"),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path => run_path(global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load(global.data_dir.as_deref())?;

    // If a specific key is requested, show just that value
    if let Some(key) = &args.key {
        return match get_config_value(&config, key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!(
                "Unknown key '{}'. Run 'qcp config keys' to list valid keys",
                key
            )),
        };
    }

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        return Ok(());
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    for (key, _) in VALID_KEYS {
        if let Some(value) = get_config_value(&config, key) {
            println!("  {:<16} {}", style(key).cyan(), value);
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command line (--data-dir)");
    println!("  2. Environment variables (QCP_DATA_DIR, QCP_BOX_CAPACITY)");
    println!("  3. Data-directory config (<data_dir>/config.yaml)");
    println!("  4. Global config (~/.config/qcpack/config.yaml)");

    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    let value = match key {
        "min_weight" => config.min_weight.to_string(),
        "max_weight" => config.max_weight.to_string(),
        "min_length" => config.min_length.to_string(),
        "max_length" => config.max_length.to_string(),
        "allowed_colors" => config
            .allowed_colors
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", "),
        "box_capacity" => config.box_capacity.to_string(),
        "data_dir" => config.data_dir.display().to_string(),
        _ => return None,
    };
    Some(value)
}

/// Convert a command-line value into the YAML value stored for `key`
fn parse_config_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    let number = |v: &str| -> Result<serde_yml::Value> {
        let n: f64 = v
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| miette::miette!("'{}' expects a number, got '{}'", key, v))?;
        Ok(serde_yml::Value::from(n))
    };

    match key {
        "min_weight" | "max_weight" | "min_length" | "max_length" => number(value),
        "box_capacity" => {
            let n: u64 = value
                .trim()
                .parse()
                .map_err(|_| miette::miette!("'box_capacity' expects a whole number, got '{}'", value))?;
            Ok(serde_yml::Value::from(n))
        }
        "allowed_colors" => Ok(serde_yml::Value::Sequence(
            value
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| serde_yml::Value::from(c.to_lowercase()))
                .collect(),
        )),
        "data_dir" => Ok(serde_yml::Value::from(value)),
        _ => Err(miette::miette!(
            "Unknown key '{}'. Run 'qcp config keys' to list valid keys",
            key
        )),
    }
}

fn config_path(global_scope: bool, global: &GlobalOpts) -> Result<PathBuf> {
    if global_scope {
        Config::global_config_path()
            .ok_or_else(|| miette::miette!("Could not determine the user config directory"))
    } else {
        let config = Config::load(global.data_dir.as_deref())?;
        Ok(config.local_config_path())
    }
}

fn read_mapping(path: &Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value = serde_yml::from_str(&content).into_diagnostic()?;
    // If the file was empty or null, use an empty mapping
    if parsed.is_null() {
        Ok(serde_yml::Value::Mapping(Default::default()))
    } else {
        Ok(parsed)
    }
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    if args.key == "data_dir" && !args.global {
        return Err(miette::miette!(
            "data_dir can only be set in the global config (use --global)"
        ));
    }
    let value = parse_config_value(&args.key, &args.value)?;
    let path = config_path(args.global, global)?;

    let mut config_map = read_mapping(&path)?;
    let mapping = config_map
        .as_mapping_mut()
        .ok_or_else(|| miette::miette!("{} is not a YAML mapping", path.display()))?;
    mapping.insert(serde_yml::Value::from(args.key.as_str()), value);

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    // Warn when the new value leaves the config unusable
    if !args.global {
        if let Err(e) = Config::load(global.data_dir.as_deref()) {
            eprintln!(
                "{} The new value makes the configuration invalid: {}",
                style("!").yellow(),
                e
            );
        }
    }

    if !global.quiet {
        let scope = if args.global { "global" } else { "data-directory" };
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(&args.value).yellow(),
            scope
        );
    }

    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let path = config_path(args.global, global)?;

    if !path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            path.display()
        ));
    }

    let mut config_map = read_mapping(&path)?;
    let removed = config_map
        .as_mapping_mut()
        .and_then(|m| m.remove(&serde_yml::Value::from(args.key.as_str())))
        .is_some();

    if !removed {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&path, yaml).into_diagnostic()?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "data-directory" };
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope
        );
    }

    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let global_path = Config::global_config_path();
    let local_path = config_path(false, global)?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    match global_path {
        Some(path) => {
            println!("  {} {}", style("Global:").cyan(), path.display());
            print_exists(path.exists());
        }
        None => println!("  {} {}", style("Global:").cyan(), style("(unavailable)").dim()),
    }
    println!();
    println!("  {} {}", style("Data dir:").cyan(), local_path.display());
    print_exists(local_path.exists());

    Ok(())
}

fn print_exists(exists: bool) {
    if exists {
        println!("            {}", style("(exists)").green());
    } else {
        println!("            {}", style("(not created)").dim());
    }
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<16} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!("{}", style("Examples:").dim());
    println!("  qcp config set box_capacity 12");
    println!("  qcp config set allowed_colors azul,verde,preto");
    println!("  qcp config set --global data_dir /srv/qcp");

    Ok(())
}
