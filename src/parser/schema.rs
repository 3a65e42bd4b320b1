//! In-memory model of a decoded callgrind profile.
//!
//! One `Context` per function block, with its cost lines and outgoing call
//! edges. Identity fields hold the raw field text (a reference token or a
//! literal name); names are resolved through the `NameTable` when rendered.

use super::compression::{EntityKind, NameTable};
use super::metadata::Metadata;
use crate::utils::config::UNKNOWN_NAME;
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;

/// Field kinds a `key=value` line can assign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Object,
    File,
    Function,
    Jump,
    /// `calls=`: the next line holds the call's cost
    Calls,
}

impl FieldKind {
    /// Map a field key to its kind and whether it targets a call edge
    ///
    /// Keys with a leading `c` (`cob`, `cfl`, `cfn`, ...) describe the callee
    /// of the call edge under construction.
    pub fn from_key(key: &str) -> Option<(Self, bool)> {
        if key == "calls" {
            return Some((FieldKind::Calls, true));
        }

        let (bare, call) = match key.strip_prefix('c') {
            Some(bare) => (bare, true),
            None => (key, false),
        };

        let kind = match bare {
            "ob" => FieldKind::Object,
            "fl" | "fi" | "fe" => FieldKind::File,
            "fn" => FieldKind::Function,
            "jump" | "jcnd" => FieldKind::Jump,
            _ => return None,
        };

        Some((kind, call))
    }

    /// Token space used for this field's reference tokens
    pub fn entity(self) -> Option<EntityKind> {
        match self {
            FieldKind::Object => Some(EntityKind::Object),
            FieldKind::File => Some(EntityKind::File),
            FieldKind::Function => Some(EntityKind::Function),
            FieldKind::Jump => Some(EntityKind::Jump),
            FieldKind::Calls => None,
        }
    }
}

/// Object/file/function/jump fields shared by blocks and call edges
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub object: Option<String>,
    pub file: Option<String>,
    pub function: Option<String>,
    pub jump: Option<String>,
}

impl Identity {
    /// Write a scalar field. `Calls` carries no scalar and is ignored.
    pub fn set(&mut self, kind: FieldKind, value: &str) {
        let slot = match kind {
            FieldKind::Object => &mut self.object,
            FieldKind::File => &mut self.file,
            FieldKind::Function => &mut self.function,
            FieldKind::Jump => &mut self.jump,
            FieldKind::Calls => return,
        };
        *slot = Some(value.to_string());
    }
}

/// One cost line attributed to a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostEntry {
    pub line: i64,
    pub costs: Vec<i64>,
}

impl CostEntry {
    /// Value of the first event, zero when the line carries none
    pub fn primary(&self) -> i64 {
        self.costs.first().copied().unwrap_or(0)
    }
}

/// One call site inside a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallEdge {
    /// Callee identity; unset fields are inherited from the caller
    pub identity: Identity,

    /// Raw call-cost line: `[line, cost, cost, ...]`
    pub costs: Vec<i64>,
}

/// One function block: accumulated costs and outgoing calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub identity: Identity,

    /// Current source line, if the format ever provides one
    pub line: Option<i64>,

    pub costs: Vec<CostEntry>,
    pub calls: Vec<CallEdge>,

    /// Last decoded full vector, state for the next cost line
    pub previous: Option<Vec<i64>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next block: identity carries over except the function name
    ///
    /// Relative decoding starts fresh: the first cost line of the new block
    /// is decoded against zero, not against the last line of this one.
    pub fn successor(&self) -> Self {
        Self {
            identity: Identity {
                function: None,
                ..self.identity.clone()
            },
            line: self.line,
            costs: Vec::new(),
            calls: Vec::new(),
            previous: None,
        }
    }

    /// A block with neither costs nor calls
    pub fn is_empty(&self) -> bool {
        self.costs.is_empty() && self.calls.is_empty()
    }

    /// Sum of the first event over every cost line, call costs included
    ///
    /// Saturates at the `i64` bounds.
    pub fn total_cost(&self) -> i64 {
        self.costs
            .iter()
            .fold(0i64, |total, entry| total.saturating_add(entry.primary()))
    }

    /// Line number of the first recorded cost line
    pub fn first_line(&self) -> Option<i64> {
        self.costs.first().map(|entry| entry.line)
    }

    /// Open a call edge whose identity starts as a copy of this block's
    pub fn open_call(&mut self) -> usize {
        self.calls.push(CallEdge {
            identity: self.identity.clone(),
            costs: Vec::new(),
        });
        self.calls.len() - 1
    }
}

/// Fully decoded profile, ready for rendering
#[derive(Debug, Clone, Default)]
pub struct Profile {
    /// Input the profile was read from
    pub source: PathBuf,

    /// Header lines, in the order first seen
    pub metadata: Metadata,

    /// Reference token tables
    pub names: NameTable,

    /// Every closed block, in input order
    pub contexts: Vec<Context>,

    /// Function field text -> index into `contexts`; the last block wins
    pub functions: HashMap<String, usize>,

    /// Physical lines consumed
    pub lines_read: usize,
}

impl Profile {
    /// Registered block for a raw function field
    pub fn function(&self, key: &str) -> Option<usize> {
        self.functions.get(key).copied()
    }

    /// Find a block by function name
    ///
    /// The name is tried as a registry key first, then through the function
    /// token table (`fn=(2) main` registers the block under `(2)`).
    pub fn find_function(&self, name: &str) -> Option<usize> {
        if let Some(index) = self.function(name) {
            return Some(index);
        }

        let token = self.names.token_for(EntityKind::Function, name)?;
        let found = self.function(token);
        if found.is_none() {
            warn!("Function {} not found", name);
        }
        found
    }

    /// Resolved name of an identity field, `None` when unset
    pub fn resolve<'a>(&'a self, kind: EntityKind, field: Option<&'a str>) -> Option<&'a str> {
        field.map(|raw| self.names.resolve(kind, raw))
    }

    /// Resolved function name of a block, for diagnostics
    pub fn function_name<'a>(&'a self, context: &'a Context) -> &'a str {
        self.resolve(EntityKind::Function, context.identity.function.as_deref())
            .unwrap_or(UNKNOWN_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys() {
        assert_eq!(FieldKind::from_key("fn"), Some((FieldKind::Function, false)));
        assert_eq!(FieldKind::from_key("cfn"), Some((FieldKind::Function, true)));
        assert_eq!(FieldKind::from_key("cob"), Some((FieldKind::Object, true)));
        assert_eq!(FieldKind::from_key("fi"), Some((FieldKind::File, false)));
        assert_eq!(FieldKind::from_key("fe"), Some((FieldKind::File, false)));
        assert_eq!(FieldKind::from_key("jcnd"), Some((FieldKind::Jump, false)));
        assert_eq!(FieldKind::from_key("calls"), Some((FieldKind::Calls, true)));
        assert_eq!(FieldKind::from_key("alls"), None);
        assert_eq!(FieldKind::from_key("cmd"), None);
        assert_eq!(FieldKind::from_key(""), None);
    }

    #[test]
    fn test_successor_inherits_identity() {
        let mut context = Context::new();
        context.identity.set(FieldKind::Object, "(1)");
        context.identity.set(FieldKind::File, "(2)");
        context.identity.set(FieldKind::Function, "(3)");
        context.costs.push(CostEntry { line: 1, costs: vec![5] });
        context.previous = Some(vec![1, 5]);
        context.open_call();

        let next = context.successor();
        assert_eq!(next.identity.object.as_deref(), Some("(1)"));
        assert_eq!(next.identity.file.as_deref(), Some("(2)"));
        assert_eq!(next.identity.function, None);
        assert!(next.is_empty());
        assert_eq!(next.previous, None);
    }

    #[test]
    fn test_total_cost_uses_first_event() {
        let mut context = Context::new();
        context.costs.push(CostEntry { line: 10, costs: vec![100, 3] });
        context.costs.push(CostEntry { line: 1, costs: vec![50] });
        context.costs.push(CostEntry { line: 2, costs: vec![] });

        assert_eq!(context.total_cost(), 150);
        assert_eq!(context.first_line(), Some(10));
    }

    #[test]
    fn test_total_cost_saturates() {
        let mut context = Context::new();
        context.costs.push(CostEntry { line: 1, costs: vec![i64::MAX] });
        context.costs.push(CostEntry { line: 2, costs: vec![i64::MAX] });
        assert_eq!(context.total_cost(), i64::MAX);

        context.costs.clear();
        context.costs.push(CostEntry { line: 1, costs: vec![i64::MIN] });
        context.costs.push(CostEntry { line: 2, costs: vec![-1] });
        assert_eq!(context.total_cost(), i64::MIN);
    }

    #[test]
    fn test_open_call_copies_caller_identity() {
        let mut context = Context::new();
        context.identity.set(FieldKind::Object, "libfoo.so");
        let index = context.open_call();
        context.calls[index].identity.set(FieldKind::Function, "bar");

        let call = &context.calls[index];
        assert_eq!(call.identity.object.as_deref(), Some("libfoo.so"));
        assert_eq!(call.identity.function.as_deref(), Some("bar"));
    }

    #[test]
    fn test_find_function_through_token() {
        let mut profile = Profile::default();
        profile.names.define(EntityKind::Function, "(2)", "main");
        profile.contexts.push(Context::new());
        profile.functions.insert("(2)".to_string(), 0);

        assert_eq!(profile.find_function("main"), Some(0));
        assert_eq!(profile.find_function("(2)"), Some(0));
        assert_eq!(profile.find_function("exit"), None);
    }

    #[test]
    fn test_find_function_token_without_block() {
        let mut profile = Profile::default();
        profile.names.define(EntityKind::Function, "(7)", "main");
        assert_eq!(profile.find_function("main"), None);
    }
}
