//! `qcp report` command - render the summary report and save it

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_inventory;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{GeneratedReport, Inventory};

#[derive(clap::Args, Debug, Default)]
pub struct ReportArgs {
    /// Only save the report, do not print it
    #[arg(long)]
    pub no_print: bool,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let inventory = open_inventory(global)?;
    generate(&inventory, &args, global)?;
    Ok(())
}

pub fn generate(
    inventory: &Inventory,
    args: &ReportArgs,
    global: &GlobalOpts,
) -> Result<GeneratedReport> {
    let report = inventory.generate_report()?;

    if global.format == OutputFormat::Json {
        let json = serde_json::json!({
            "path": report.path,
            "summary": report.summary,
        });
        println!("{}", serde_json::to_string_pretty(&json).into_diagnostic()?);
        return Ok(report);
    }

    if !args.no_print && !global.quiet {
        print!("{}", report.text);
        if !report.text.ends_with('\n') {
            println!();
        }
        println!();
    }
    if !global.quiet {
        println!(
            "{} Report saved to {}",
            style("✓").green(),
            style(report.path.display()).cyan()
        );
    }

    Ok(report)
}
