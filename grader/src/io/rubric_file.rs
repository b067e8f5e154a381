//! Rubric import/export as standalone JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde_json::Value;
use tracing::debug;

use crate::core::error::{CoreError, CoreResult};
use crate::core::invariants::validate_rubric;
use crate::rubric::DeductionNode;

const RUBRIC_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/rubric/v1.schema.json"
));

/// Write the rubric tree verbatim as pretty JSON.
pub fn export_rubric(path: &Path, tree: &DeductionNode) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(tree).context("serialize rubric")?;
    buf.push('\n');
    fs::write(path, buf).with_context(|| format!("write rubric {}", path.display()))
}

/// Read and validate a rubric file. Nothing is committed here; the caller
/// swaps the returned tree into its session only on success.
pub fn import_rubric(path: &Path) -> Result<DeductionNode> {
    let raw = fs::read_to_string(path).with_context(|| format!("read rubric {}", path.display()))?;
    let tree = parse_rubric(&raw).with_context(|| format!("import rubric {}", path.display()))?;
    debug!(path = %path.display(), nodes = tree.subtree_len(), "rubric parsed");
    Ok(tree)
}

/// Parse, schema-check, deserialize, then check semantic invariants.
pub fn parse_rubric(raw: &str) -> CoreResult<DeductionNode> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CoreError::MalformedInput(format!("rubric json: {err}")))?;
    if !value.is_object() {
        return Err(CoreError::MalformedInput(
            "rubric must be a JSON object".to_string(),
        ));
    }
    validate_schema(RUBRIC_SCHEMA, &value)?;
    let tree: DeductionNode = serde_json::from_value(value)
        .map_err(|err| CoreError::MalformedInput(format!("rubric shape: {err}")))?;
    let errors = validate_rubric(&tree);
    if !errors.is_empty() {
        return Err(CoreError::MalformedInput(errors.join("; ")));
    }
    Ok(tree)
}

/// Validate against a Draft 2020-12 schema. A schema that does not parse or
/// compile is reported as malformed input, not as a refused operation.
fn validate_schema(schema: &str, instance: &Value) -> CoreResult<()> {
    let schema: Value = serde_json::from_str(schema)
        .map_err(|err| CoreError::MalformedInput(format!("rubric schema: {err}")))?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .map_err(|err| CoreError::MalformedInput(format!("rubric schema: {err}")))?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(CoreError::MalformedInput(format!(
            "rubric schema validation failed: {}",
            messages.join("; ")
        )));
    }
    Ok(())
}
