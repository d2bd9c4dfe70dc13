//! Interactive menu - the default when `qcp` runs without a command
//!
//! The inventory is loaded once and kept for the whole session. Operation
//! errors are shown and the menu continues; only terminal errors end it.

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::{boxes, list, register, remove, report};
use crate::cli::helpers::{open_inventory, parse_measurement};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Inventory, InventoryError};

const CHOICES: &[&str] = &[
    "1. Register a part",
    "2. List approved and rejected parts",
    "3. Remove a part",
    "4. List closed boxes",
    "5. Generate report",
    "6. Exit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Register,
    List,
    Remove,
    Boxes,
    Report,
    Exit,
}

impl Choice {
    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Choice::Register),
            1 => Some(Choice::List),
            2 => Some(Choice::Remove),
            3 => Some(Choice::Boxes),
            4 => Some(Choice::Report),
            5 => Some(Choice::Exit),
            _ => None,
        }
    }
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let mut inventory = open_inventory(global)?;
    let theme = ColorfulTheme::default();
    // Tables read better than TSV in a terminal session
    let session = GlobalOpts {
        format: OutputFormat::Auto,
        ..global.clone()
    };

    println!("{}", style("Quality control and packing").bold().underlined());
    loop {
        println!();
        let selection = Select::with_theme(&theme)
            .with_prompt("Choose an option")
            .items(CHOICES)
            .default(0)
            .interact_opt()
            .into_diagnostic()?;

        // Escape or q leaves like "Exit"
        let choice = selection
            .and_then(Choice::from_index)
            .unwrap_or(Choice::Exit);

        let outcome = match choice {
            Choice::Register => register_part(&mut inventory, &theme, &session),
            Choice::List => list::print_lists(&inventory, &list::ListArgs::default(), &session),
            Choice::Remove => remove_part(&mut inventory, &theme, &session),
            Choice::Boxes => boxes::print_boxes(&inventory, &boxes::BoxesArgs::default(), &session),
            Choice::Report => {
                report::generate(&inventory, &report::ReportArgs::default(), &session).map(|_| ())
            }
            Choice::Exit => break,
        };

        if let Err(report) = outcome {
            eprintln!("{:?}", report);
        }
    }

    Ok(())
}

fn prompt_measurement(theme: &ColorfulTheme, prompt: &str) -> Result<f64> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .validate_with(|input: &String| parse_measurement(input).map(|_| ()))
        .interact_text()
        .into_diagnostic()?;
    parse_measurement(&raw).map_err(|e| miette::miette!(e))
}

fn register_part(inventory: &mut Inventory, theme: &ColorfulTheme, global: &GlobalOpts) -> Result<()> {
    let weight = prompt_measurement(theme, "Weight (g)")?;
    let length = prompt_measurement(theme, "Length (cm)")?;
    let color: String = Input::with_theme(theme)
        .with_prompt("Color")
        .interact_text()
        .into_diagnostic()?;

    match inventory.register(weight, length, &color) {
        Ok(item) => register::print_registered(&item, inventory, global),
        Err(InventoryError::Persist(source)) => {
            print_unsaved(&source);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn remove_part(inventory: &mut Inventory, theme: &ColorfulTheme, global: &GlobalOpts) -> Result<()> {
    let raw: String = Input::with_theme(theme)
        .with_prompt("Part ID")
        .validate_with(|input: &String| {
            input
                .trim()
                .parse::<u64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not a part ID", input.trim()))
        })
        .interact_text()
        .into_diagnostic()?;
    let id: u64 = raw.trim().parse().into_diagnostic()?;

    match inventory.remove(id) {
        Ok(item) => remove::print_removed(&item, global),
        Err(InventoryError::Persist(source)) => {
            print_unsaved(&source);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_unsaved(source: &crate::core::StoreError) {
    eprintln!(
        "{} Change applied for this session but not saved: {}",
        style("!").yellow(),
        source
    );
}
