//! Cost-annotated call tree rendering.
//!
//! Walks the call graph from a root block, one line per visited function:
//!
//! ```text
//!      150 |  + main()           app.c [line 10]
//!       30 |    + foo()          app.c [line 20]
//! ```
//!
//! There is no visited set. Recursion stops at terminal functions, at stub
//! frames, and at the depth limit; a call is skipped when it targets the
//! calling block itself or the same function as the previous rendered
//! sibling.

use crate::parser::compression::EntityKind;
use crate::parser::schema::{Context, Profile};
use crate::utils::config::{is_terminal, AnnotateConfig, INDENT_STEP, UNKNOWN_NAME};
use crate::utils::error::RenderError;
use log::{trace, warn};
use std::borrow::Cow;

/// Render the call tree rooted at the configured root function
///
/// **Public** - main entry point for tree rendering
///
/// # Errors
/// * `RenderError::EmptyProfile` - no block to start from
pub fn render_call_tree(profile: &Profile, config: &AnnotateConfig) -> Result<String, RenderError> {
    let root = select_root(profile, config)?;

    let mut out = String::new();
    walk(profile, config, root, 0, &mut out);
    Ok(out)
}

/// Index of the block the tree starts from
///
/// Falls back to the first block when the root function is not found.
pub fn select_root(profile: &Profile, config: &AnnotateConfig) -> Result<usize, RenderError> {
    if let Some(index) = profile.find_function(&config.root_function) {
        return Ok(index);
    }

    if profile.contexts.is_empty() {
        return Err(RenderError::EmptyProfile);
    }

    warn!(
        "Did not find '{}' => using first context",
        config.root_function
    );
    Ok(0)
}

/// Append `()` to plain symbol names
///
/// Names with a space, a quote or an argument list are already decorated
/// and are left alone.
pub fn normalize_function_name(name: &str) -> Cow<'_, str> {
    if name.contains([' ', '\'', '(']) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}()"))
    }
}

fn walk(profile: &Profile, config: &AnnotateConfig, index: usize, depth: usize, out: &mut String) {
    let context = &profile.contexts[index];
    let function = profile.function_name(context);

    if config.is_stub(function) {
        trace!("Skipping stub frame {}", function);
        return;
    }

    let function = normalize_function_name(function);
    let prefix = " ".repeat(depth * INDENT_STEP);

    out.push_str(&format_line(
        context.total_cost(),
        &prefix,
        &function,
        &location(profile, context),
    ));
    out.push('\n');

    if is_terminal(&function) {
        trace!("{} is terminal", function);
        return;
    }

    if depth + 1 > config.max_depth {
        out.push_str(&format!(
            "{:8} | {}  ABORT (max depth {} reached)\n",
            "", prefix, config.max_depth
        ));
        return;
    }

    // Function key of the last call recursed into at this level
    let mut previous: Option<&str> = None;

    for call in &context.calls {
        let key = call.identity.function.as_deref().unwrap_or(UNKNOWN_NAME);

        let Some(target) = profile.function(key) else {
            warn!(
                "Unknown function: {}",
                profile.names.resolve(EntityKind::Function, key)
            );
            continue;
        };

        let target_key = profile.contexts[target].identity.function.as_deref();
        trace!("Function call: {} => {:?}", key, target_key);

        if target == index || target_key == previous {
            continue;
        }

        previous = target_key;
        walk(profile, config, target, depth + 1, out);
    }
}

/// One tree line: right-aligned cost, indentation, name, location
fn format_line(total: i64, prefix: &str, function: &str, location: &[String]) -> String {
    let base = format!("{:8} | {} + {}", total, prefix, function);
    let line = format!("{:<30} {}", base, location.join(" "));
    line.trim_end().to_string()
}

/// Location suffix: file details when the file is known, else the object
fn location(profile: &Profile, context: &Context) -> Vec<String> {
    let mut pieces = Vec::new();

    if let Some(file) = known_name(profile, EntityKind::File, context.identity.file.as_deref()) {
        pieces.push(file.to_string());

        if let Some(line) = context.line.filter(|line| *line >= 0) {
            pieces.push(format!(":: {line}"));
        }

        if let Some(first) = context.first_line().filter(|line| *line > 0) {
            pieces.push(format!("[line {first}]"));
        }
    } else if let Some(object) =
        known_name(profile, EntityKind::Object, context.identity.object.as_deref())
    {
        pieces.push(format!("[{object}]"));
    }

    pieces
}

/// Resolved name of a field, `None` when unset or written as `???`
fn known_name<'a>(profile: &'a Profile, kind: EntityKind, field: Option<&'a str>) -> Option<&'a str> {
    profile
        .resolve(kind, field)
        .filter(|name| *name != UNKNOWN_NAME)
}
