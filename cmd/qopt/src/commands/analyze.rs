use anyhow::{Context, Result};
use colored::Colorize;
use quota_optimiser::{parse_request, validate_request, AnalysisReport, OptimizerEngine};
use std::fs;

use crate::commands::format_level;
use crate::utils::{print_machine, read_json};
use crate::OutputFormat;

pub fn handle(
    engine: &OptimizerEngine,
    workflow_path: String,
    issues_path: Option<String>,
    params_path: Option<String>,
    intent_path: Option<String>,
    output: &OutputFormat,
) -> Result<()> {
    let content = fs::read_to_string(&workflow_path)
        .with_context(|| format!("Failed to read workflow file: {}", workflow_path))?;
    let mut request = parse_request(&content).context("Invalid workflow JSON")?;

    // Flags override whatever the request file carried
    if let Some(path) = issues_path {
        request.issues = read_json(&path, "issues")?;
    }
    if let Some(path) = params_path {
        request.params = read_json(&path, "params")?;
    }
    if let Some(path) = intent_path {
        request.intent = Some(read_json(&path, "intent")?);
    }

    validate_request(&request)?;

    let report = engine.analyze(&request);
    let savings = engine.estimate_total_savings(&request);

    if !print_machine(&report, output)? {
        print_report(&report, savings);
    }

    Ok(())
}

fn print_report(report: &AnalysisReport, savings: f64) {
    println!("{} Workflow: {}", "•".blue(), report.workflow_id.cyan());
    println!("  Total quota cost: {:.2}", report.total_quota_cost);
    println!("  Estimated savings: {}", format!("{:.1}%", savings).green());

    if !report.techniques.is_empty() {
        println!();
        println!("{}", "Techniques".bold());
        for score in &report.techniques {
            println!(
                "  {} {} ({:.2})",
                "•".blue(),
                score.technique.name(),
                score.relevance_score
            );
        }
    }

    if !report.optimizations.is_empty() {
        println!();
        println!("{}", "Optimizations".bold());
        for optimization in &report.optimizations {
            println!(
                "  {} [{}] {}",
                "→".cyan(),
                optimization.optimization_type.as_str().yellow(),
                optimization.description
            );
            println!(
                "      saves {:.2} vibes, {:.2} specs ({:.1}%) across {}",
                optimization.estimated_savings.vibes,
                optimization.estimated_savings.specs,
                optimization.estimated_savings.percentage,
                optimization.steps_affected.join(", ").bright_black()
            );
        }
    }

    if let Some(framing) = &report.frameworks.option_framing {
        println!();
        println!("{}", "Options".bold());
        for option in [&framing.conservative, &framing.balanced, &framing.bold] {
            println!(
                "  {} {}: saves {:.2}, ROI {:.2}, effort {}, risk {}",
                "•".blue(),
                option.name.cyan(),
                option.quota_savings,
                option.estimated_roi,
                format_level(option.effort),
                format_level(option.risk)
            );
            println!("      {}", option.summary);
        }
    }

    if let Some(zero_based) = &report.frameworks.zero_based {
        println!();
        println!("{}", "Zero-based redesign".bold());
        println!(
            "  Potential savings {:.0}%, risk {}",
            zero_based.potential_savings,
            format_level(zero_based.implementation_risk)
        );
        println!("  {}", zero_based.radical_approach);
    }

    if !report.batched_operations.is_empty() {
        println!();
        println!("{}", "Batches".bold());
        for batch in &report.batched_operations {
            println!(
                "  {} {} (saves {:.2})",
                "•".blue(),
                batch.description,
                batch.estimated_savings
            );
        }
    }

    if !report.caching.cache_points.is_empty() {
        println!();
        println!(
            "{} (hit rate {:.0}%)",
            "Cache points".bold(),
            report.caching.estimated_hit_rate * 100.0
        );
        for point in &report.caching.cache_points {
            println!(
                "  {} {} key={} ttl={}s",
                "•".blue(),
                point.step_id.cyan(),
                point.cache_key,
                point.ttl
            );
        }
    }

    if !report.specs.is_empty() {
        println!();
        println!("{}", "Specs".bold());
        for spec in &report.specs {
            println!(
                "  {} {} {} ({} steps, cost {:.2})",
                "•".blue(),
                spec.id.bright_black(),
                spec.name,
                spec.steps.len(),
                spec.estimated_quota_cost
            );
        }
    }

    for failure in &report.failures {
        println!("{} {} failed: {}", "✗".red(), failure.unit, failure.reason);
    }
}
