//! CLI command implementations
//!
//! Commands are one-shot: read a request, run the splitter, print the result.
//! Nothing is persisted.

use std::path::Path;

use crate::config::SplitterConfig;
use crate::planner::{Severity, SplitExplain};
use crate::request::SplitRequest;

use super::args::{Command, OutputFormat};
use super::errors::{CliError, CliResult};
use super::io::{write_json, write_text};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Split {
            request,
            config,
            format,
        } => split(&request, config.as_deref(), format),
        Command::Validate { request } => validate(&request),
    }
}

/// Split a request file and print the explanation.
///
/// A rejected split is printed too, then reported as an error.
pub fn split(
    request_path: &Path,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> CliResult<()> {
    let config = match config_path {
        Some(path) => SplitterConfig::load(path)?,
        None => SplitterConfig::default(),
    };
    let request = SplitRequest::load(request_path)?;

    match render_split(&request, config, format) {
        Ok(output) => write_text(&output),
        Err(CliError::Planner(err)) if err.severity() == Severity::Reject => {
            let explain = SplitExplain::from_error(&err);
            match format {
                OutputFormat::Text => write_text(&explain.to_string())?,
                OutputFormat::Json => write_json(&explain)?,
            }
            Err(CliError::Planner(err))
        }
        Err(err) => Err(err),
    }
}

/// Lowers and splits a request, returning the rendered explanation
pub fn render_split(
    request: &SplitRequest,
    config: SplitterConfig,
    format: OutputFormat,
) -> CliResult<String> {
    let lowered = request.lower()?;
    let split = lowered.splitter(config)?.process()?;
    let explain = SplitExplain::from_split(&split, &lowered.arena);

    Ok(match format {
        OutputFormat::Text => explain.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&explain)?,
    })
}

/// Resolve a request file and validate its join conditions
pub fn validate(request_path: &Path) -> CliResult<()> {
    let request = SplitRequest::load(request_path)?;
    let lowered = request.lower()?;
    lowered.splitter(SplitterConfig::default())?;

    write_text(&format!(
        "OK: {} relations, {} join pairs",
        lowered.arena.len(),
        lowered.join_pairs.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn request(join_condition: serde_json::Value) -> SplitRequest {
        serde_json::from_value(json!({
            "relations": [
                {"name": "a", "kind": "table", "columns": ["id", "x"]},
                {"name": "b", "kind": "table", "columns": ["id", "y"]}
            ],
            "join_pairs": [{"left": "a", "right": "b", "type": "inner", "condition": join_condition}],
            "query": {
                "where": {"call": {"name": "op_>", "args": [{"field": "a.x"}, {"literal": 1}]}},
                "outputs": [{"field": "a.x"}, {"field": "b.y"}]
            }
        }))
        .unwrap()
    }

    fn equi_join() -> serde_json::Value {
        json!({"call": {"name": "op_=", "args": [{"field": "a.id"}, {"field": "b.id"}]}})
    }

    #[test]
    fn test_render_split_text() {
        let output =
            render_split(&request(equi_join()), SplitterConfig::default(), OutputFormat::Text)
                .unwrap();
        assert!(output.contains("Status: ACCEPTED"));
        assert!(output.contains("  Where: a.x > 1"));
        assert!(output.contains("Residual Where: MATCH_ALL"));
    }

    #[test]
    fn test_render_split_json() {
        let output =
            render_split(&request(equi_join()), SplitterConfig::default(), OutputFormat::Json)
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["accepted"], true);
        assert_eq!(value["relations"][1]["name"], "b");
    }

    #[test]
    fn test_render_split_rejects_match_join_condition() {
        let condition = json!({"match": {"fields": ["a.x", "b.y"], "term": "foo"}});
        let err = render_split(&request(condition), SplitterConfig::default(), OutputFormat::Text)
            .unwrap_err();
        assert_eq!(err.code(), "RELSPLIT_INVALID_JOIN_CONDITION");
    }

    #[test]
    fn test_validate_file() {
        let mut file = NamedTempFile::new().unwrap();
        let body = serde_json::to_string(&json!({
            "relations": [{"name": "a", "kind": "table", "columns": ["x"]}],
            "query": {"outputs": [{"field": "a.x"}]}
        }))
        .unwrap();
        write!(file, "{}", body).unwrap();

        validate(file.path()).unwrap();
    }

    #[test]
    fn test_split_missing_request_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = split(&dir.path().join("absent.json"), None, OutputFormat::Text).unwrap_err();
        assert!(matches!(err, CliError::Request(_)));
    }
}
