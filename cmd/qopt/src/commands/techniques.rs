use anyhow::Result;
use colored::Colorize;
use quota_optimiser::frameworks::select_techniques;
use quota_optimiser::{OptionalParams, ParsedIntent};

use crate::utils::{print_machine, read_json, read_json_or_default};
use crate::OutputFormat;

pub fn handle(intent_path: String, params_path: Option<String>, output: &OutputFormat) -> Result<()> {
    let intent: ParsedIntent = read_json(&intent_path, "intent")?;
    let params: OptionalParams = read_json_or_default(params_path.as_deref(), "params")?;

    let scores = select_techniques(&intent, Some(&params));

    if !print_machine(&scores, output)? {
        println!("Techniques for: {}", intent.business_goal.cyan());
        println!();
        for score in &scores {
            println!(
                "{} {:<14} {:.2}  {}",
                "•".blue(),
                score.technique.name().yellow(),
                score.relevance_score,
                score.technique.description().bright_black()
            );
        }
    }

    Ok(())
}
