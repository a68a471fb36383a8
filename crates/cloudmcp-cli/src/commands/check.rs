//! `cloudmcp check` command implementation.
//!
//! Validates a configuration file:
//! - JSON Schema validation of the raw YAML against an embedded schema
//! - Structural checks (accounts, default account, tokens, URLs)
//! - With `--verify`, a live token check of every account

use anyhow::Result;
use cloudmcp_core::CloudMcpConfig;
use cloudmcp_core::config::LINODE_TOKEN_ENV;
use cloudmcp_mcp::Service;
use cloudmcp_mcp::protocol::RequestContext;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

// ============================================================================
// Embedded JSON Schema
// ============================================================================

/// Compiled into the binary so validation works without external files.
const CONFIG_SCHEMA: &str = include_str!("../../schemas/cloudmcp.schema.json");

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Check that produced the finding.
    pub category: String,
    pub message: String,
    pub file: Option<PathBuf>,
    /// Location within the file, e.g. `accounts.staging.token_env`.
    pub location: Option<String>,
}

impl CheckFinding {
    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            file: None,
            location: None,
        }
    }

    fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Collection of check findings.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    fn by_severity(&self, severity: Severity) -> Vec<&CheckFinding> {
        let mut findings: Vec<_> = self
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect();
        findings.sort_by(|a, b| a.category.cmp(&b.category));
        findings
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        let errors = self.by_severity(Severity::Error);
        let warnings = self.by_severity(Severity::Warning);
        let infos = self.by_severity(Severity::Info);

        if !errors.is_empty() {
            println!("\n❌ Errors ({}):", errors.len());
            println!("{}", "─".repeat(60));
            for finding in &errors {
                print_finding(finding);
            }
        }

        if !warnings.is_empty() {
            println!("\n⚠️  Warnings ({}):", warnings.len());
            println!("{}", "─".repeat(60));
            for finding in &warnings {
                print_finding(finding);
            }
        }

        if !infos.is_empty() {
            println!("\nℹ️  Info ({}):", infos.len());
            println!("{}", "─".repeat(60));
            for finding in &infos {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "═".repeat(60));
        if errors.is_empty() && warnings.is_empty() {
            println!("✅ All checks passed!");
        } else {
            println!(
                "Summary: {} error(s), {} warning(s)",
                errors.len(),
                warnings.len()
            );
            if !errors.is_empty() {
                println!("\n❌ Configuration has errors that must be fixed.");
            }
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    };

    let location = match (&finding.file, &finding.location) {
        (Some(f), Some(l)) => format!(" [{}:{}]", f.display(), l),
        (Some(f), None) => format!(" [{}]", f.display()),
        (None, Some(l)) => format!(" [{}]", l),
        (None, None) => String::new(),
    };

    println!(
        "  {} [{}]{}: {}",
        icon, finding.category, location, finding.message
    );
}

// ============================================================================
// Main Check Runner
// ============================================================================

/// Run every check and return the findings without printing them.
pub async fn run_quiet(config_path: &Path, verify: bool) -> Result<CheckResults> {
    let mut results = CheckResults::default();

    let mut config = if config_path.exists() {
        // 1. JSON Schema validation
        results.extend(validate_json_schema(config_path));

        // 2. Parse
        match CloudMcpConfig::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                results.add(
                    CheckFinding::error("parse", e.to_string()).with_file(config_path),
                );
                return Ok(results);
            }
        }
    } else {
        results.add(
            CheckFinding::info(
                "file",
                format!("configuration file not found, relying on {LINODE_TOKEN_ENV}"),
            )
            .with_file(config_path),
        );
        CloudMcpConfig::default()
    };
    config.apply_env_fallback();

    // 3. Structure: accounts and default account
    if let Err(e) = config.validate() {
        results.add(CheckFinding::error("structure", e.to_string()));
        return Ok(results);
    }

    // 4. Tokens and URLs
    results.extend(check_accounts(&config));

    // 5. Live token verification
    if verify && !results.has_errors() {
        results.extend(verify_accounts(&config).await);
    }

    Ok(results)
}

/// Run all configuration checks and print the report.
pub async fn run(config_path: &Path, verify: bool) -> Result<()> {
    println!("🔍 Checking cloudmcp configuration...");
    println!("   Config: {}", config_path.display());
    if verify {
        println!("   Verifying tokens against the Linode API");
    }

    let results = run_quiet(config_path, verify).await?;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "Configuration has {} error(s)",
            results.count(Severity::Error)
        );
    }

    Ok(())
}

// ============================================================================
// Check 1: JSON Schema
// ============================================================================

fn validate_json_schema(yaml_path: &Path) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    let content = match std::fs::read_to_string(yaml_path) {
        Ok(c) => c,
        Err(e) => {
            findings.push(
                CheckFinding::error("json-schema", format!("Failed to read file: {}", e))
                    .with_file(yaml_path),
            );
            return findings;
        }
    };

    let yaml_value: JsonValue = match serde_yaml::from_str(&content) {
        Ok(JsonValue::Null) => JsonValue::Object(Default::default()),
        Ok(v) => v,
        Err(e) => {
            findings.push(
                CheckFinding::error("json-schema", format!("Failed to parse YAML: {}", e))
                    .with_file(yaml_path),
            );
            return findings;
        }
    };

    let schema: JsonValue = match serde_json::from_str(CONFIG_SCHEMA) {
        Ok(s) => s,
        Err(e) => {
            findings.push(CheckFinding::error(
                "json-schema",
                format!("Embedded schema is not valid JSON: {}", e),
            ));
            return findings;
        }
    };

    let compiled = match jsonschema::validator_for(&schema) {
        Ok(c) => c,
        Err(e) => {
            findings.push(CheckFinding::error(
                "json-schema",
                format!("Failed to compile JSON schema: {}", e),
            ));
            return findings;
        }
    };

    for error in compiled.iter_errors(&yaml_value) {
        let path_str = error.instance_path().to_string();
        let location = if path_str.is_empty() {
            "(root)".to_string()
        } else {
            path_str
        };

        findings.push(
            CheckFinding::error("json-schema", error.to_string())
                .with_file(yaml_path)
                .with_location(location),
        );
    }

    findings
}

// ============================================================================
// Check 2: Accounts
// ============================================================================

fn check_accounts(config: &CloudMcpConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    let mut names: Vec<_> = config.accounts.keys().collect();
    names.sort();

    for name in names {
        let account = &config.accounts[name];
        let location = format!("accounts.{name}");

        if account.resolved_token().is_empty() {
            let message = match &account.token_env {
                Some(var) => format!(
                    "account '{name}' has no token: `token` is empty and {var} is not set"
                ),
                None => format!("account '{name}' has no token"),
            };
            findings.push(CheckFinding::error("tokens", message).with_location(&location));
        } else if !account.uses_env_token() && account.token_env.is_none() {
            findings.push(
                CheckFinding::info(
                    "tokens",
                    format!("account '{name}' stores its token inline; consider token_env"),
                )
                .with_location(&location),
            );
        }

        if account.label.trim().is_empty() {
            findings.push(
                CheckFinding::warning("accounts", format!("account '{name}' has no label"))
                    .with_location(&location),
            );
        }

        if let Some(url) = &account.api_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            findings.push(
                CheckFinding::error(
                    "accounts",
                    format!("api_url '{url}' must start with http:// or https://"),
                )
                .with_location(format!("{location}.api_url")),
            );
        }
    }

    if !config.metrics.path.starts_with('/') {
        findings.push(
            CheckFinding::error("metrics", "metrics path must start with '/'")
                .with_location("metrics.path"),
        );
    }

    findings
}

// ============================================================================
// Check 3: Live verification
// ============================================================================

async fn verify_accounts(config: &CloudMcpConfig) -> Vec<CheckFinding> {
    let mut findings = Vec::new();

    let service = match Service::new(config) {
        Ok(s) => s,
        Err(e) => {
            findings.push(CheckFinding::error("verify", e.to_string()));
            return findings;
        }
    };

    let default = service.accounts().current_name();
    match service.initialize(&RequestContext::new()).await {
        Ok(()) => findings.push(CheckFinding::info(
            "verify",
            format!("default account '{default}' verified"),
        )),
        Err(e) => findings.push(CheckFinding::error("verify", e.to_string())),
    }

    for name in service.accounts().list().into_keys() {
        if name == default {
            continue;
        }
        let account = match service.accounts().get(&name) {
            Ok(a) => a,
            Err(e) => {
                findings.push(CheckFinding::error("verify", e.to_string()));
                continue;
            }
        };
        match account.client().get_profile().await {
            Ok(profile) => findings.push(CheckFinding::info(
                "verify",
                format!("account '{name}' verified as {}", profile.username),
            )),
            Err(e) => findings.push(
                CheckFinding::error("verify", format!("account '{name}': {e}"))
                    .with_location(format!("accounts.{name}")),
            ),
        }
    }

    if let Err(e) = service.shutdown(&RequestContext::new()).await {
        tracing::debug!(error = %e, "Shutdown after verification failed");
    }

    findings
}
