//! Table formatting utilities for CLI list commands
//!
//! Lists are built once as headers + string rows and rendered in whichever
//! format was requested. JSON output is structured data rather than a
//! table, so callers serialize their entities directly for it.

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{describe_reasons, format_measurement};
use crate::cli::OutputFormat;
use crate::core::QualityRules;
use crate::entities::{Item, PartBox};

/// A list ready to be rendered
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Render in the requested format. `Json` falls back to TSV; callers
    /// that support JSON handle it before building a table.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Auto => Ok(self.boxed(false)),
            OutputFormat::Md => Ok(self.boxed(true)),
            OutputFormat::Csv => self.csv(),
            OutputFormat::Id => Ok(self
                .rows
                .iter()
                .filter_map(|r| r.first())
                .map(|id| format!("{}\n", id))
                .collect()),
            OutputFormat::Tsv | OutputFormat::Json => Ok(self.tsv()),
        }
    }

    fn boxed(&self, markdown: bool) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        let mut table = builder.build();
        if markdown {
            table.with(Style::markdown());
        } else {
            table.with(Style::rounded());
        }
        let mut out = table.to_string();
        out.push('\n');
        out
    }

    fn tsv(&self) -> String {
        let mut out = self.headers.join("\t");
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    fn csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            writer.write_record(row).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }
}

/// Table of parts: id, weight, length, color, status
pub fn items_table(items: &[&Item], rules: &QualityRules) -> Table {
    let mut table = Table::new(["ID", "Weight (g)", "Length (cm)", "Color", "Status"]);
    for item in items {
        let status = if item.approved {
            "approved".to_string()
        } else {
            format!("rejected: {}", describe_reasons(item, rules))
        };
        table.push(vec![
            item.id.to_string(),
            format_measurement(item.weight),
            format_measurement(item.length),
            item.color.clone(),
            status,
        ]);
    }
    table
}

/// Table of boxes: number, fill, part ids
pub fn boxes_table(boxes: &[PartBox], capacity: usize) -> Table {
    let mut table = Table::new(["Box", "Parts", "IDs"]);
    for b in boxes {
        let ids = b
            .item_ids()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.push(vec![b.number.to_string(), b.fill_label(capacity), ids]);
    }
    table
}
