//! `qcp register` command - classify a new part and pack it when approved

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{describe_reasons, open_inventory, parse_measurement};
use crate::cli::table::items_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Inventory, Location};
use crate::entities::Item;

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    /// Weight in grams (a comma is accepted as decimal separator)
    #[arg(long, short = 'w', value_parser = parse_measurement, allow_hyphen_values = true)]
    pub weight: f64,

    /// Length in centimeters
    #[arg(long, short = 'l', value_parser = parse_measurement, allow_hyphen_values = true)]
    pub length: f64,

    /// Color name (case-insensitive)
    #[arg(long, short = 'c')]
    pub color: String,
}

pub fn run(args: RegisterArgs, global: &GlobalOpts) -> Result<()> {
    let mut inventory = open_inventory(global)?;
    let item = inventory.register(args.weight, args.length, &args.color)?;
    print_registered(&item, &inventory, global)
}

/// Report the outcome of a registration in the requested format
pub fn print_registered(item: &Item, inventory: &Inventory, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", item.id);
            return Ok(());
        }
        OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            print!("{}", items_table(&[item], inventory.rules()).render(global.format)?);
            return Ok(());
        }
        OutputFormat::Auto => {}
    }

    if global.quiet {
        return Ok(());
    }

    if !item.approved {
        println!(
            "{} Part #{} rejected: {}",
            style("✗").red(),
            style(item.id).cyan(),
            describe_reasons(item, inventory.rules())
        );
        return Ok(());
    }

    match inventory.locate(item.id) {
        Some(Location::OpenBox(number)) => {
            println!(
                "{} Part #{} approved {} box #{} ({})",
                style("✓").green(),
                style(item.id).cyan(),
                style("→").dim(),
                number,
                inventory.open_box().fill_label(inventory.capacity())
            );
        }
        Some(Location::ClosedBox(number)) => {
            println!(
                "{} Part #{} approved {} box #{} ({}/{})",
                style("✓").green(),
                style(item.id).cyan(),
                style("→").dim(),
                number,
                inventory.capacity(),
                inventory.capacity()
            );
            println!(
                "  {} Box #{} is full and has been closed",
                style("■").yellow(),
                style(number).bold()
            );
        }
        Some(Location::Rejected) | None => {
            println!("{} Part #{} approved", style("✓").green(), style(item.id).cyan());
        }
    }

    Ok(())
}
