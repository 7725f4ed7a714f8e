// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `runo config`, `runo rules` and `runo follow-up`.

use chrono::{DateTime, Utc};
use runo_config::RunoConfig;
use runo_core::RunoError;
use runo_session::DispositionRules;
use runo_session::rules::RuleRow;

/// Print the effective configuration as TOML.
pub fn run_config(config: &RunoConfig) -> Result<(), RunoError> {
    let rendered = toml::to_string_pretty(config)
        .map_err(|e| RunoError::Config(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}

/// Print the disposition table and the configured stage rules.
pub fn run_rules(config: &RunoConfig, use_color: bool) -> Result<(), RunoError> {
    let rules = DispositionRules::from_config(&config.follow_up);

    println!();
    println!("  disposition rules ({})", outcome_list(&rules));
    println!("  {}", "-".repeat(66));
    println!("    {:<15} {:<18} {:<10} auto follow-up", "L1", "L2", "comment");
    for row in rules.rows() {
        println!("    {}", format_row(&row, use_color));
    }

    println!();
    println!("  stage rules (default follow-up {}h)", config.follow_up.default_hours);
    println!("  {}", "-".repeat(66));
    if config.follow_up.stages.is_empty() {
        println!("    (none)");
    }
    for stage in &config.follow_up.stages {
        let cap = stage
            .max_days
            .map(|d| format!("max {d}d"))
            .unwrap_or_else(|| "no cap".to_string());
        let auto = stage
            .auto_hours
            .map(|h| format!("auto +{h}h"))
            .unwrap_or_else(|| "auto default".to_string());
        println!("    {:<15} {:<12} {auto}", stage.code, cap);
    }
    println!();
    Ok(())
}

/// Print the follow-up timestamp that would be filled in automatically now.
pub fn run_follow_up(config: &RunoConfig, stage: Option<&str>) -> Result<(), RunoError> {
    let rules = DispositionRules::from_config(&config.follow_up);
    if let Some(code) = stage {
        if rules.stage_rule(code).is_none() {
            eprintln!("runo: no rule for stage `{code}`, using the default offset");
        }
    }
    println!("{}", follow_up_at(&rules, stage, Utc::now())?.to_rfc3339());
    Ok(())
}

fn follow_up_at(
    rules: &DispositionRules,
    stage: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, RunoError> {
    Ok(rules.compute_auto_follow_up(stage, now)?)
}

fn outcome_list(rules: &DispositionRules) -> String {
    rules.l1_options().collect::<Vec<_>>().join(", ")
}

fn format_row(row: &RuleRow<'_>, use_color: bool) -> String {
    let comment = if row.rule.comment_mandatory {
        "required"
    } else {
        "optional"
    };
    let auto = if row.rule.auto_follow_up { "yes" } else { "no" };
    let line = format!("{:<15} {:<18} {:<10} {auto}", row.l1, row.l2, comment);
    if use_color && row.rule.comment_mandatory {
        use colored::Colorize;
        line.yellow().to_string()
    } else {
        line
    }
}
