//! `qcp list` command - show approved and rejected parts

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_inventory;
use crate::cli::table::items_table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Inventory;
use crate::entities::Item;

#[derive(clap::Args, Debug, Default)]
pub struct ListArgs {
    /// Show only approved parts
    #[arg(long, conflicts_with = "rejected")]
    pub approved: bool,

    /// Show only rejected parts
    #[arg(long)]
    pub rejected: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let inventory = open_inventory(global)?;
    print_lists(&inventory, &args, global)
}

/// Print the requested lists. Machine formats get one combined table where
/// the status column tells the two apart.
pub fn print_lists(inventory: &Inventory, args: &ListArgs, global: &GlobalOpts) -> Result<()> {
    let show_approved = !args.rejected;
    let show_rejected = !args.approved;

    let approved = if show_approved {
        inventory.list_approved()
    } else {
        Vec::new()
    };
    let rejected = if show_rejected {
        inventory.list_rejected()
    } else {
        Vec::new()
    };

    match global.format {
        OutputFormat::Json => {
            let json = match (show_approved, show_rejected) {
                (true, false) => serde_json::to_string_pretty(&approved),
                (false, true) => serde_json::to_string_pretty(&rejected),
                _ => serde_json::to_string_pretty(&serde_json::json!({
                    "approved": approved,
                    "rejected": rejected,
                })),
            }
            .into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Auto => {
            if show_approved {
                print_section("Approved parts", "No approved parts", &approved, inventory)?;
            }
            if show_approved && show_rejected {
                println!();
            }
            if show_rejected {
                print_section("Rejected parts", "No rejected parts", &rejected, inventory)?;
            }
        }
        _ => {
            let mut all: Vec<&Item> = approved.into_iter().chain(rejected).collect();
            all.sort_by_key(|i| i.id);
            print!("{}", items_table(&all, inventory.rules()).render(global.format)?);
        }
    }

    Ok(())
}

fn print_section(title: &str, empty: &str, items: &[&Item], inventory: &Inventory) -> Result<()> {
    println!("{} ({})", style(title).bold(), items.len());
    if items.is_empty() {
        println!("  {}", style(empty).dim());
    } else {
        print!("{}", items_table(items, inventory.rules()).render(OutputFormat::Auto)?);
    }
    Ok(())
}
