//! `qcp boxes` command - show closed boxes and the box being filled

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_inventory;
use crate::cli::table::{boxes_table, items_table};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Inventory;

#[derive(clap::Args, Debug, Default)]
pub struct BoxesArgs {
    /// Also list the parts inside each closed box
    #[arg(long, short = 'i')]
    pub items: bool,
}

pub fn run(args: BoxesArgs, global: &GlobalOpts) -> Result<()> {
    let inventory = open_inventory(global)?;
    print_boxes(&inventory, &args, global)
}

pub fn print_boxes(inventory: &Inventory, args: &BoxesArgs, global: &GlobalOpts) -> Result<()> {
    let closed = inventory.list_closed_boxes();
    let capacity = inventory.capacity();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(closed).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Auto => {}
        _ => {
            print!("{}", boxes_table(closed, capacity).render(global.format)?);
            return Ok(());
        }
    }

    println!("{} ({})", style("Closed boxes").bold(), closed.len());
    if closed.is_empty() {
        println!("  {}", style("No closed boxes").dim());
    } else {
        print!("{}", boxes_table(closed, capacity).render(OutputFormat::Auto)?);
    }

    if args.items {
        for part_box in closed {
            println!();
            println!("{}", style(format!("Box #{}", part_box.number)).cyan());
            let items: Vec<_> = part_box.items.iter().collect();
            print!("{}", items_table(&items, inventory.rules()).render(OutputFormat::Auto)?);
        }
    }

    if !global.quiet {
        let open = inventory.open_box();
        println!();
        println!(
            "{} Open box #{}: {}",
            style("→").dim(),
            open.number,
            open.fill_label(capacity)
        );
    }

    Ok(())
}
