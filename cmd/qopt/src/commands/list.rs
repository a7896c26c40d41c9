use anyhow::Result;
use colored::Colorize;
use quota_optimiser::OptimizerEngine;
use serde::Serialize;

use crate::utils::print_machine;
use crate::OutputFormat;

#[derive(Serialize)]
struct Listed<'a> {
    id: &'a str,
    description: &'a str,
}

pub fn handle(engine: &OptimizerEngine, output: &OutputFormat) -> Result<()> {
    let techniques = engine.list_techniques();
    let listed: Vec<Listed> = techniques
        .iter()
        .map(|(id, description)| Listed { id, description })
        .collect();

    if !print_machine(&listed, output)? {
        println!("Available techniques and passes:");
        println!();
        for entry in &listed {
            println!("{} {:<24} {}", "•".blue(), entry.id.cyan(), entry.description);
        }
    }

    Ok(())
}
