//! Block template catalog commands for CLI.

use blockday_core::schedule::catalog;
use clap::Subcommand;

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List every available template
    List,
    /// Show one template's block composition
    Show {
        /// Template ID (e.g. "standard", "pomodoro", "deep-work", "half-day")
        id: String,
    },
}

pub fn run(action: TemplateAction) -> CliResult {
    match action {
        TemplateAction::List => {
            let summaries: Vec<_> = catalog()
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "name": t.name,
                        "description": t.description,
                        "total_work_minutes": t.total_work_minutes,
                        "total_break_minutes": t.total_break_minutes,
                        "blocks": t.blocks.len(),
                    })
                })
                .collect();
            print_json(&summaries)
        }
        TemplateAction::Show { id } => match catalog().iter().find(|t| t.id == id) {
            Some(template) => print_json(template),
            None => Err(format!("unknown template: {id}").into()),
        },
    }
}
