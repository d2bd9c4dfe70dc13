//! Report rendering with embedded Tera templates

use miette::Diagnostic;
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::core::report::ReportSummary;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const REPORT_TEMPLATE: &str = "report.txt.tera";

#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template rendering error: {0}")]
    #[diagnostic(code(qcpack::template::render))]
    RenderError(String),
}

/// Report renderer using Tera
pub struct ReportRenderer {
    tera: Tera,
}

impl ReportRenderer {
    /// Create a renderer with the embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render the summary report
    pub fn render_report(&self, summary: &ReportSummary) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == REPORT_TEMPLATE) {
            return Ok(hardcoded_report(summary));
        }

        let context = tera::Context::from_serialize(summary)
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        let mut text = self
            .tera
            .render(REPORT_TEMPLATE, &context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))?;
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

/// Plain fallback used when the embedded template is unavailable
fn hardcoded_report(summary: &ReportSummary) -> String {
    let mut lines = vec![
        "=== Quality Control Report ===".to_string(),
        format!("Generated: {}", summary.generated_at),
        String::new(),
        format!("Total registered parts: {}", summary.total),
        format!("Approved parts: {}", summary.approved),
        format!("Rejected parts: {}", summary.rejected),
    ];
    if !summary.rejection_reasons.is_empty() {
        lines.push(String::new());
        lines.push("Rejection reasons:".to_string());
        for rc in &summary.rejection_reasons {
            lines.push(format!("- {}: {}", rc.label, rc.count));
        }
    }
    lines.push(String::new());
    lines.push(format!("Closed boxes: {}", summary.closed_boxes));
    lines.push(format!(
        "Open box #{}: {} parts",
        summary.open_box_number, summary.open_box_fill
    ));
    if !summary.open_box_ids.is_empty() {
        lines.push(format!("IDs: {}", summary.open_box_ids));
    }
    lines.push(String::new());
    lines.push(format!("Summary: {}", summary.headline));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
