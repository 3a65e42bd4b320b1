//! Full text report: echoed headers, then the framed call tree.

use super::call_tree::render_call_tree;
use crate::parser::metadata::Metadata;
use crate::parser::schema::Profile;
use crate::utils::config::{AnnotateConfig, RULE_WIDTH};
use crate::utils::error::RenderError;
use log::debug;

/// Render the complete report for a parsed profile
///
/// **Public** - used by the annotate command
///
/// Layout:
/// ```text
///    creator: callgrind-3.22.0
///     events: Ir
/// --------------------------------------------------------------------------------
/// Call stack:
///      150 |  + main()
/// --------------------------------------------------------------------------------
/// ```
pub fn render_report(profile: &Profile, config: &AnnotateConfig) -> Result<String, RenderError> {
    let tree = render_call_tree(profile, config)?;
    debug!("Rendered call tree ({} lines)", tree.lines().count());

    let rule = "-".repeat(RULE_WIDTH);
    let mut report = render_headers(&profile.metadata);

    report.push_str(&rule);
    report.push('\n');
    report.push_str("Call stack:\n");
    report.push_str(&tree);
    report.push_str(&rule);
    report.push('\n');

    Ok(report)
}

/// Header lines as `KEY: VALUE`, keys right-aligned
pub fn render_headers(metadata: &Metadata) -> String {
    metadata
        .iter()
        .map(|(key, value)| format!("{:>10}: {}\n", key, value))
        .collect()
}
