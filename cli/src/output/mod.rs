//! Terminal output for plans, paths and run summaries

use colored::Colorize;
use lmprep_core::steps::{PlannedAction, StepOutcome};
use lmprep_core::{ModelPaths, RunReport};

/// Print the actions a run would take
pub fn print_plan(paths: &ModelPaths, plan: &[(String, Vec<PlannedAction>)]) {
    print_paths(paths);
    println!();
    for (step, actions) in plan {
        println!("{}", format!("[{}]", step).bold());
        if actions.is_empty() {
            println!("  {}", "(skipped)".dimmed());
        }
        for action in actions {
            println!("  {}", action);
        }
    }
}

pub fn print_paths(paths: &ModelPaths) {
    let group = paths
        .group_dir
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(unset)".to_string());
    println!("group_dir:  {}", group);
    println!("models_dir: {}", paths.models_dir.display());
}

/// One line per step, then the total time
pub fn print_summary(report: &RunReport) {
    for step in &report.steps {
        let status = match &step.outcome {
            StepOutcome::Completed => "done".green(),
            StepOutcome::Unchanged => "unchanged".cyan(),
            StepOutcome::Skipped { reason } => format!("skipped ({})", reason).yellow(),
        };
        eprintln!(
            "  {} {:<10} {} ({:.1}s)",
            "✓".green(),
            step.name,
            status,
            step.duration.as_secs_f64()
        );
    }
    eprintln!(
        "{} in {:.1}s",
        "Language model generated".green().bold(),
        report.total_duration().as_secs_f64()
    );
}
