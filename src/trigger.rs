//! Detection of trigger events declared in a workflow's `on` section.

use serde_yaml::Value;

use crate::workflow::ParsedWorkflow;

/// Trigger events tallied by the summary report, in report order.
pub const MAJOR_TRIGGERS: [&str; 4] = ["push", "pull_request", "schedule", "workflow_dispatch"];

/// Reports whether the workflow declares the trigger `name`.
///
/// The `on` section may be a mapping (key presence), a sequence (element
/// presence) or a single event name (equality). Any other shape, including a
/// missing section, declares nothing. Triggers stored under the boolean key
/// `true` are honored as well; see [`ParsedWorkflow::triggers`].
///
/// # Examples
///
/// ```
/// use wfharvest::{ParsedWorkflow, has_trigger};
///
/// let workflow = ParsedWorkflow::parse("on:\n  push: {}\n  pull_request: {}\n",)?;
/// assert!(has_trigger(&workflow, "push",));
/// assert!(!has_trigger(&workflow, "schedule",));
/// # Ok::<(), wfharvest::Error>(())
/// ```
pub fn has_trigger(workflow: &ParsedWorkflow, name: &str,) -> bool
{
    match workflow.triggers() {
        Some(Value::Mapping(events,),) => events.contains_key(name,),
        Some(Value::Sequence(events,),) => events.iter().any(|event| event.as_str() == Some(name,),),
        Some(Value::String(event,),) => event == name,
        _ => false,
    }
}
