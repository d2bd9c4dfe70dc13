//! `qcp remove` command - take a part out of the open box or the rejected registry

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_inventory;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::Item;

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Identifier of the part to remove
    pub id: u64,
}

pub fn run(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut inventory = open_inventory(global)?;
    let item = inventory.remove(args.id)?;
    print_removed(&item, global)
}

pub fn print_removed(item: &Item, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", item.id),
        _ if global.quiet => {}
        _ => {
            let from = if item.approved {
                "open box"
            } else {
                "rejected registry"
            };
            println!(
                "{} Removed part #{} from the {}",
                style("✓").green(),
                style(item.id).cyan(),
                from
            );
        }
    }
    Ok(())
}
