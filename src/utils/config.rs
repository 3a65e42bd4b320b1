//! Configuration and constants for decoding and rendering.

/// Root function looked up when none is given on the command line
pub const DEFAULT_ROOT_FUNCTION: &str = "main";

/// Maximum number of indentation levels below the root
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Spaces added to the prefix for every level of the call tree
pub const INDENT_STEP: usize = 2;

/// Width of the horizontal rules framing the report
pub const RULE_WIDTH: usize = 80;

/// Value stored for a `*` token on a call-cost line
pub const CALL_COST_SENTINEL: i64 = 1337;

/// Placeholder shown for identity fields that were never set
pub const UNKNOWN_NAME: &str = "???";

// Leaf primitives whose callees are never rendered. Names are compared after
// `()` normalization.
pub const FUNCTION_TERMINALS: &[&str] = &[
    "regfree()",
    "regcomp()",
    "regexec()",
    "__umodti3()",
    "__umodti3'2",
    "malloc()",
    "calloc()",
    "realloc()",
    "free()",
    "memcpy()",
    "memset()",
];

// Linker/loader trampolines filtered from the tree
pub const STUB_MARKERS: &[&str] = &["stub ", "dyld_stub"];

/// Immutable settings threaded through parsing and rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotateConfig {
    /// Function the call tree starts from
    pub root_function: String,

    /// Deepest indentation level rendered before aborting a branch
    pub max_depth: usize,

    /// Skip linker/loader stub frames entirely
    pub ignore_stubs: bool,

    /// Trace every decoding step through the logger
    pub verbose: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            root_function: DEFAULT_ROOT_FUNCTION.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            ignore_stubs: true,
            verbose: false,
        }
    }
}

impl AnnotateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root_function = root.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_ignore_stubs(mut self, ignore_stubs: bool) -> Self {
        self.ignore_stubs = ignore_stubs;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether a resolved function name is a stub frame to be hidden
    pub fn is_stub(&self, function: &str) -> bool {
        self.ignore_stubs && STUB_MARKERS.iter().any(|marker| function.contains(marker))
    }
}

/// Whether a normalized function name stops the walk
pub fn is_terminal(function: &str) -> bool {
    FUNCTION_TERMINALS.contains(&function)
}
