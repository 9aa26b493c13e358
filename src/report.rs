//! Output formatting for handlercheck results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: the run summary serialized whole, for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::detect::{MethodVerdict, RunSummary, Severity, SkippedRoute, Violation, ViolationRule};

// =============================================================================
// JSON Format
// =============================================================================

/// Serialize the summary as pretty JSON.
pub fn to_json(summary: &RunSummary) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Write results in JSON format.
pub fn write_json(summary: &RunSummary) -> anyhow::Result<()> {
    println!("{}", to_json(summary)?);
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "handlercheck";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    pub full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
}

/// Rule metadata for SARIF output.
struct RuleInfo {
    name: &'static str,
    short_description: &'static str,
    full_description: &'static str,
}

fn get_rule_info(rule: ViolationRule) -> RuleInfo {
    match rule {
        ViolationRule::RequestValidation => RuleInfo {
            name: "RequestValidation",
            short_description: "Handlers must validate request data before using it",
            full_description: "Flags handlers that read request data without calling the validator, and (as a warning) handlers that read route parameters without any validation.",
        },
        ViolationRule::TypedSuccessReturn => RuleInfo {
            name: "TypedSuccessReturn",
            short_description: "Success responses must declare their result type",
            full_description: "Flags success response constructions that are not given an explicit type argument, e.g. ok(user) instead of ok<User>(user).",
        },
        ViolationRule::CatalogErrorReturn => RuleInfo {
            name: "CatalogErrorReturn",
            short_description: "Error responses must come from the error catalog",
            full_description: "Flags error response constructions built from inline objects or strings instead of a named entry of the central error catalog.",
        },
    }
}

fn map_severity_to_level(severity: &Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    }
}

/// Build a SARIF report with one result per violation.
pub fn sarif_report(summary: &RunSummary) -> SarifReport {
    let rules: Vec<SarifRule> = ViolationRule::ALL
        .into_iter()
        .map(|rule| {
            let info = get_rule_info(rule);
            SarifRule {
                id: rule.as_str().to_string(),
                name: info.name.to_string(),
                short_description: SarifMessage {
                    text: info.short_description.to_string(),
                },
                full_description: SarifMessage {
                    text: info.full_description.to_string(),
                },
                default_config: SarifRuleConfig {
                    level: "error".to_string(),
                },
            }
        })
        .collect();

    let results: Vec<SarifResult> = summary
        .all_verdicts
        .iter()
        .flat_map(|verdict| {
            verdict.violations.iter().map(move |v| SarifResult {
                rule_id: v.rule.as_str().to_string(),
                level: map_severity_to_level(&v.severity).to_string(),
                message: SarifMessage {
                    text: format!("{}: {}", verdict.qualified_name(), v.message),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifact {
                            uri: verdict.file.clone(),
                        },
                        region: SarifRegion {
                            start_line: v.line.max(1),
                        },
                    },
                }],
            })
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif(summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(summary))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, config_path: Option<&str>, summary: &RunSummary) {
    // Header
    println!();
    print!("  ");
    print!("{}", "handlercheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Project: ".dimmed());
    println!("{}", path);
    print!("  {}", "Config:  ".dimmed());
    println!("{}", config_path.unwrap_or("(defaults)"));
    println!();

    if !summary.failing_verdicts.is_empty() {
        println!(
            "  {} ({}):",
            "Failing handlers".bold(),
            summary.failing_verdicts.len()
        );
        println!();
        for verdict in &summary.failing_verdicts {
            write_verdict(verdict);
        }
    }

    // Passing handlers that still carry advisories.
    let advisories: Vec<&MethodVerdict> = summary
        .all_verdicts
        .iter()
        .filter(|v| v.passed && !v.violations.is_empty())
        .collect();
    if !advisories.is_empty() {
        println!("  {} ({}):", "Warnings".bold(), advisories.len());
        println!();
        for verdict in advisories {
            write_verdict(verdict);
        }
    }

    if !summary.skipped.is_empty() {
        write_skipped(&summary.skipped);
        println!();
    }

    write_summary_line(summary);
    println!();
}

fn write_verdict(verdict: &MethodVerdict) {
    print!("    {}", verdict.qualified_name().bold());
    print!("  {}", verdict.file.blue());
    println!("{}", format!(":{}", verdict.line).dimmed());

    for v in &verdict.violations {
        write_violation(v);
    }
    println!();
}

fn write_violation(v: &Violation) {
    write_severity_tag(&v.severity);
    print!(" {:<22}", v.rule.as_str().dimmed());
    print!("{}", format!("line {}", v.line).dimmed());
    println!("  {}", v.message);
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("      {}", "ERROR".red()),
        Severity::Warning => print!("      {}", "WARN ".yellow()),
    }
}

fn write_skipped(skipped: &[SkippedRoute]) {
    println!("  {} ({}):", "Skipped routes".dimmed(), skipped.len());

    let controllers: BTreeSet<&str> = skipped.iter().map(|s| s.controller.as_str()).collect();
    for controller in controllers {
        for s in skipped.iter().filter(|s| s.controller == controller) {
            print!("    {}.{}", s.controller, s.handler);
            print!("  {}", s.file.blue());
            println!("  {}", format!("({})", s.reason).dimmed());
        }
    }
}

fn write_summary_line(summary: &RunSummary) {
    let warnings = summary.count_severity(Severity::Warning);

    print!("  ");
    if summary.has_failures() {
        print!("{}", "✗ FAIL".red());
    } else {
        print!("{}", "✓ PASS".green());
    }
    print!(
        "  {} handlers: {} passed, ",
        summary.total_methods,
        summary.passed_methods.to_string().green()
    );
    if summary.failed_methods > 0 {
        print!("{} failed", summary.failed_methods.to_string().red());
    } else {
        print!("0 failed");
    }
    if warnings > 0 {
        print!(", {}", format!("{} warnings", warnings).yellow());
    }
    if summary.whitelisted > 0 {
        print!(
            "  {}",
            format!("({} whitelisted)", summary.whitelisted).dimmed()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RunSummary {
        let verdicts = vec![
            MethodVerdict::new(
                "WidgetsController",
                "show",
                "app/controllers/widgets_controller.ts",
                3,
                vec![Violation {
                    rule: ViolationRule::TypedSuccessReturn,
                    message: "success response has no explicit result type".to_string(),
                    line: 5,
                    severity: Severity::Error,
                }],
            ),
            MethodVerdict::new("WidgetsController", "index", "app/controllers/widgets_controller.ts", 9, vec![]),
        ];
        RunSummary::from_verdicts(verdicts, vec![], 0)
    }

    #[test]
    fn test_json_has_summary_fields() {
        let json = to_json(&summary()).unwrap();
        for field in [
            "\"totalMethods\"",
            "\"passedMethods\"",
            "\"failedMethods\"",
            "\"allVerdicts\"",
            "\"failingVerdicts\"",
            "\"ruleId\"",
            "\"controllerName\"",
        ] {
            assert!(json.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_sarif_results() {
        let report = sarif_report(&summary());
        assert_eq!(report.version, "2.1.0");
        assert_eq!(report.runs[0].tool.driver.rules.len(), 3);
        let results = &report.runs[0].results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_id, "typed-success-return");
        assert_eq!(results[0].level, "error");
        assert_eq!(results[0].locations[0].physical_location.region.start_line, 5);
        assert!(results[0].message.text.starts_with("WidgetsController.show"));
    }
}
