//! Command-line interface for the Universal Search validator.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use usv_connectors::{
    Connector, ConnectorRegistry, FieldValues, FormDescriptor, JurisdictionMode, QueryService,
    Submission, SubmissionError,
};

use crate::bundle::{validate_bundle, BundleReport};
use crate::config::CliConfig;
use crate::error::{CliError, Result};

/// Universal Search Validator - inspect connectors, render query XML and
/// check bundle files.
#[derive(Parser)]
#[command(name = "usv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available connectors.
    Connectors {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Describe a connector's query types, or the form of one query type.
    Describe {
        /// Connector id (e.g., CA_ESUN)
        connector: String,

        /// Query type (e.g., vehicle-registration)
        query_type: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate a submission and print the rendered XML request.
    Render {
        /// Connector id (e.g., FL_FCIC)
        connector: String,

        /// Query type (e.g., driver-license)
        query_type: String,

        /// Jurisdiction mode: in-state or out-of-state
        #[arg(short, long)]
        mode: Option<JurisdictionMode>,

        /// Field value as key=value (repeatable)
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// JSON file with an object of field values
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Message id for the <Id> element
        #[arg(long)]
        message_id: Option<String>,

        /// Print the rendered request or the failure as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load and check a directory of connector tables.
    CheckTables {
        /// Directory containing *.yaml connector tables
        dir: PathBuf,
    },

    /// Check a Federated Search bundle JSON file.
    CheckBundle {
        /// Path to the bundle JSON file
        file: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::from_env()?;
    execute(cli.command, &config)
}

/// Execute a parsed command with the given configuration.
pub fn execute(command: Commands, config: &CliConfig) -> Result<()> {
    // These do not use the configured registry
    let command = match command {
        Commands::CheckTables { dir } => return check_tables_command(&dir),
        Commands::CheckBundle { file, json } => return check_bundle_command(&file, json),
        other => other,
    };

    let loaded = config.load_registry()?;
    let registry = loaded.as_ref().unwrap_or_else(|| ConnectorRegistry::builtin());

    match command {
        Commands::Connectors { json } => connectors_command(registry, json),
        Commands::Describe {
            connector,
            query_type,
            json,
        } => describe_command(registry, config, &connector, query_type.as_deref(), json),
        Commands::Render {
            connector,
            query_type,
            mode,
            fields,
            input,
            message_id,
            json,
        } => {
            let mut submission = Submission::new(connector, query_type)
                .with_mode(mode.unwrap_or(config.default_mode));
            submission.values = collect_values(&fields, input.as_deref())?;
            submission.message_id = message_id;
            render_command(registry, &submission, json)
        }
        Commands::CheckTables { .. } | Commands::CheckBundle { .. } => Ok(()),
    }
}

/// Merge values from the input file and `--field` arguments.
///
/// `--field` values override values from the file.
pub fn collect_values(fields: &[String], input: Option<&Path>) -> Result<FieldValues> {
    let mut values = match input {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str::<FieldValues>(&content)?
        }
        None => FieldValues::new(),
    };

    for field in fields {
        let (key, value) = field
            .split_once('=')
            .ok_or_else(|| CliError::Usage(format!("invalid --field '{field}', expected KEY=VALUE")))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::Usage(format!(
                "invalid --field '{field}', key is empty"
            )));
        }
        values.insert(key.to_string(), value.to_string());
    }

    Ok(values)
}

fn connectors_command(registry: &ConnectorRegistry, json: bool) -> Result<()> {
    let summaries = registry.list_summaries();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let default_id = registry.default_connector().map(|c| c.id.as_str());
    for summary in &summaries {
        let marker = if Some(summary.id.as_str()) == default_id {
            style(" (default)").dim().to_string()
        } else {
            String::new()
        };
        println!(
            "{}{}  {} [{}]",
            style(&summary.id).cyan().bold(),
            marker,
            summary.description,
            summary.region
        );
    }
    Ok(())
}

fn lookup<'r>(registry: &'r ConnectorRegistry, id: &str) -> Result<&'r Connector> {
    QueryService::new(registry)
        .connector(id)
        .map_err(CliError::from)
}

fn describe_command(
    registry: &ConnectorRegistry,
    config: &CliConfig,
    connector_id: &str,
    query_type: Option<&str>,
    json: bool,
) -> Result<()> {
    let connector = lookup(registry, connector_id)?;

    let Some(query_type) = query_type else {
        if json {
            println!("{}", serde_json::to_string_pretty(&connector.query_specs)?);
        } else {
            print_connector(connector);
        }
        return Ok(());
    };

    let catalog = config.load_datasets()?;
    let form = FormDescriptor::build(connector, query_type, catalog.as_ref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&form)?);
    } else {
        print_form(&form);
    }
    Ok(())
}

fn print_connector(connector: &Connector) {
    println!(
        "{} {}",
        style(&connector.id).cyan().bold(),
        style(&connector.name).bold()
    );
    println!("  {}", connector.description);
    println!("  Region: {}", connector.region);
    if let Some(purpose) = connector.purpose_code() {
        println!("  Purpose code: {} (required)", purpose.key);
    }
    if connector.omit_state_for_in_state {
        println!("  State omitted for in-state queries");
    }

    for spec in &connector.query_specs {
        println!();
        let version = spec.version.map(|v| format!(" v{v}")).unwrap_or_default();
        println!(
            "{} ({}{})",
            style(&spec.query_type).green().bold(),
            spec.message_type,
            version
        );
        for combination in &spec.combinations {
            println!(
                "  {:>2}. [{}] {} ({})",
                combination.id,
                combination.reference_code,
                combination.description,
                combination.applies_to.as_str()
            );
        }
    }
}

fn print_form(form: &FormDescriptor) {
    println!(
        "{} {} ({})",
        style(&form.connector_id).cyan().bold(),
        style(&form.name).bold(),
        form.message_type
    );
    println!();
    for field in &form.fields {
        let required = if field.required {
            style(" *").red().to_string()
        } else {
            String::new()
        };
        println!("  {}{}  {}", style(&field.key).bold(), required, field.label);
        if let Some(hint) = &field.hint {
            println!("      {}", style(hint).dim());
        }
        if !field.options.is_empty() {
            let values: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
            println!("      options: {}", values.join(", "));
        } else if let Some(dataset) = &field.dataset {
            println!("      options from {dataset}");
        }
    }
    println!();
    println!("{}", style("Combinations").bold());
    for combination in &form.combinations {
        let optional = if combination.optional.is_empty() {
            String::new()
        } else {
            format!(" [{}]", combination.optional.join(", "))
        };
        println!(
            "  {:>2}. [{}] {}{} ({})",
            combination.id,
            combination.reference_code,
            combination.required.join(", "),
            optional,
            combination.applies_to.as_str()
        );
    }
}

fn render_command(registry: &ConnectorRegistry, submission: &Submission, json: bool) -> Result<()> {
    let result = QueryService::new(registry).submit(submission);

    if json {
        match &result {
            Ok(request) => println!("{}", serde_json::to_string_pretty(request)?),
            Err(e) => println!("{}", serde_json::to_string_pretty(e)?),
        }
    } else if let Ok(request) = &result {
        println!("{}", request.xml);
        eprintln!(
            "{} combination {} [{}]",
            style("Matched").green().bold(),
            request.combination_id,
            request.reference_code
        );
    }

    if let Err(SubmissionError::FieldValidation { violations }) = &result {
        if !json {
            for violation in violations {
                eprintln!("  {} {violation}", style("-").red());
            }
        }
    }

    result.map(|_| ()).map_err(CliError::from)
}

fn check_tables_command(dir: &Path) -> Result<()> {
    let registry = ConnectorRegistry::from_dir(dir)?;

    for connector in registry.connectors() {
        let combinations: usize = connector
            .query_specs
            .iter()
            .map(|s| s.combinations.len())
            .sum();
        println!(
            "{} {}: {} fields, {} query types, {} combinations",
            style("✓").green(),
            style(&connector.id).cyan().bold(),
            connector.fields.len(),
            connector.query_specs.len(),
            combinations
        );
    }
    println!();
    println!(
        "{} {} connector table(s) OK",
        style("Checked").green().bold(),
        registry.len()
    );
    Ok(())
}

fn check_bundle_command(file: &Path, json: bool) -> Result<()> {
    let content = fs::read_to_string(file)?;
    let doc: serde_json::Value = serde_json::from_str(&content)?;
    let report = validate_bundle(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_bundle_report(file, &report);
    }

    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidBundle {
            errors: report.errors.len(),
        })
    }
}

fn print_bundle_report(file: &Path, report: &BundleReport) {
    println!("File: {}", file.display());
    println!("Bundles: {}", report.bundles);
    if !report.type_counts.is_empty() {
        println!();
        println!("Configuration types:");
        for (kind, count) in &report.type_counts {
            println!("  {kind}: {count}");
        }
    }

    println!();
    println!("Errors: {}", report.errors.len());
    for error in &report.errors {
        println!("  {} {error}", style("✗").red());
    }
    println!();
    println!("Warnings: {}", report.warnings.len());
    for warning in &report.warnings {
        println!("  {} {warning}", style("!").yellow());
    }

    println!();
    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("{}", style("All checks passed. Bundle is ready to import.").green().bold());
    } else if report.errors.is_empty() {
        println!(
            "{}",
            style("No errors. Review the warnings before importing.").yellow()
        );
    } else {
        println!("{}", style("Fix the errors before importing.").red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_parse_render() {
        let cli = Cli::parse_from([
            "usv",
            "render",
            "CA_ESUN",
            "driver-license",
            "--mode",
            "out-of-state",
            "--field",
            "operatorLicenseNumber=A1234567",
            "-f",
            "state=NV",
        ]);

        let Commands::Render {
            connector,
            query_type,
            mode,
            fields,
            input,
            ..
        } = cli.command
        else {
            panic!("expected render command");
        };
        assert_eq!(connector, "CA_ESUN");
        assert_eq!(query_type, "driver-license");
        assert_eq!(mode, Some(JurisdictionMode::OutOfState));
        assert_eq!(fields, vec!["operatorLicenseNumber=A1234567", "state=NV"]);
        assert!(input.is_none());
    }

    #[test]
    fn test_cli_parse_describe() {
        let cli = Cli::parse_from(["usv", "describe", "FL_FCIC", "--json"]);
        let Commands::Describe {
            connector,
            query_type,
            json,
        } = cli.command
        else {
            panic!("expected describe command");
        };
        assert_eq!(connector, "FL_FCIC");
        assert!(query_type.is_none());
        assert!(json);
    }

    #[test]
    fn test_cli_rejects_bad_mode() {
        let result = Cli::try_parse_from(["usv", "render", "CA_ESUN", "driver-license", "-m", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_collect_values_merges_file_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.json");
        fs::write(&path, r#"{"name": "DOE, JOHN", "sexCode": "F"}"#).unwrap();

        let values = collect_values(
            &["sexCode=M".to_string(), "birthDate=1980-05-01".to_string()],
            Some(&path),
        )
        .unwrap();
        assert_eq!(values.get("name").map(String::as_str), Some("DOE, JOHN"));
        assert_eq!(values.get("sexCode").map(String::as_str), Some("M"));
        assert_eq!(values.len(), 3);
    }

    #[test]
    fn test_collect_values_keeps_equals_in_value() {
        let values = collect_values(&["requestor=A=B".to_string()], None).unwrap();
        assert_eq!(values.get("requestor").map(String::as_str), Some("A=B"));
    }

    #[test]
    fn test_collect_values_rejects_malformed_field() {
        let err = collect_values(&["licensePlateNumber".to_string()], None).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));

        let err = collect_values(&["=ABC".to_string()], None).unwrap_err();
        assert!(err.to_string().contains("key is empty"));
    }

    #[test]
    fn test_execute_render_unknown_connector() {
        let command = Commands::Render {
            connector: "TX_TLETS".to_string(),
            query_type: "driver-license".to_string(),
            mode: None,
            fields: Vec::new(),
            input: None,
            message_id: None,
            json: false,
        };
        let err = execute(command, &CliConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Submission(SubmissionError::UnknownConnector { .. })
        ));
    }
}
