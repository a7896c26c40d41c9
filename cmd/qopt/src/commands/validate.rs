use anyhow::Result;
use colored::Colorize;
use quota_optimiser::{workflow_violations, Workflow};
use serde::Serialize;

use crate::utils::{print_machine, read_json};
use crate::OutputFormat;

#[derive(Serialize)]
struct ValidationOutcome {
    workflow_id: String,
    valid: bool,
    errors: Vec<String>,
}

pub fn handle(file: String, output: &OutputFormat) -> Result<()> {
    let workflow: Workflow = read_json(&file, "workflow")?;

    let errors = workflow_violations(&workflow);

    let outcome = ValidationOutcome {
        workflow_id: workflow.id.clone(),
        valid: errors.is_empty(),
        errors,
    };

    if !print_machine(&outcome, output)? {
        if outcome.valid {
            println!(
                "{} Workflow is valid: {} ({} steps, {} edges)",
                "✓".green(),
                outcome.workflow_id.cyan(),
                workflow.steps.len(),
                workflow.data_flow.len()
            );
        } else {
            println!("{} Workflow is invalid: {}", "✗".red(), outcome.workflow_id.cyan());
            for error in &outcome.errors {
                println!("  - {}", error.red());
            }
        }
    }

    if !outcome.valid {
        anyhow::bail!("{} validation error(s)", outcome.errors.len());
    }

    Ok(())
}
