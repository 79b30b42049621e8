//! Parsed representation of a GitHub Actions workflow document.
//!
//! Workflow files are kept as untyped YAML values: real-world workflows vary
//! too much for a strict schema, and the analyzers only need to peek at the
//! `on` and `jobs` sections. Empty documents parse to an empty workflow
//! rather than failing.

use std::{fs, path::Path};

use serde_yaml::{Mapping, Value};

use crate::error::{self, Error};

/// Decoded workflow document.
///
/// # Examples
///
/// ```
/// use wfharvest::ParsedWorkflow;
///
/// let workflow = ParsedWorkflow::parse("on: push\njobs: {}\n",)?;
/// assert!(workflow.triggers().is_some());
/// # Ok::<(), wfharvest::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq,)]
pub struct ParsedWorkflow
{
    root: Value,
}

impl ParsedWorkflow
{
    /// Parses a workflow from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`](Error::Parse) when the text is not valid YAML.
    pub fn parse(contents: &str,) -> Result<Self, Error,>
    {
        if contents.trim().is_empty() {
            return Ok(Self {
                root: Value::Null,
            },);
        }
        let root: Value = serde_yaml::from_str(contents,)?;
        Ok(Self {
            root,
        },)
    }

    /// Reads and parses a workflow file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](Error::Io) when the file cannot be read as UTF-8
    /// and [`Error::Parse`](Error::Parse) when it is not valid YAML.
    pub fn load(path: &Path,) -> Result<Self, Error,>
    {
        let contents = fs::read_to_string(path,).map_err(|source| error::io_error(path, source,),)?;
        Self::parse(&contents,)
    }

    /// Returns `true` when the document carries no content at all.
    pub fn is_empty(&self,) -> bool
    {
        !is_truthy(&self.root,)
    }

    /// Top-level mapping, when the document is one.
    pub fn as_mapping(&self,) -> Option<&Mapping,>
    {
        self.root.as_mapping()
    }

    /// Trigger section of the workflow.
    ///
    /// YAML 1.1 parsers read an unquoted `on` key as the boolean `true`, so
    /// documents emitted by such tools store the triggers under `true`. The
    /// `on` key wins when it holds a non-empty value.
    pub fn triggers(&self,) -> Option<&Value,>
    {
        let mapping = self.as_mapping()?;
        mapping
            .get("on",)
            .filter(|value| is_truthy(value,),)
            .or_else(|| mapping.get(Value::Bool(true,),),)
    }

    /// The `jobs` mapping, when present.
    pub fn jobs(&self,) -> Option<&Mapping,>
    {
        self.as_mapping()?.get("jobs",)?.as_mapping()
    }
}

/// Mirrors YAML truthiness: null, `false`, zero and empty collections are
/// falsy.
fn is_truthy(value: &Value,) -> bool
{
    match value {
        Value::Null => false,
        Value::Bool(flag,) => *flag,
        Value::Number(number,) => number.as_f64().is_some_and(|n| n != 0.0,),
        Value::String(text,) => !text.is_empty(),
        Value::Sequence(items,) => !items.is_empty(),
        Value::Mapping(entries,) => !entries.is_empty(),
        Value::Tagged(tagged,) => is_truthy(&tagged.value,),
    }
}
