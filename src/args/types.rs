//! Schema-side argument types.
//!
//! An [`ArgSpec`] describes one command-line argument the way a module
//! declares it; an [`ArgSet`] is the ordered, keyed collection of specs
//! belonging to one module. Both are immutable templates: parsed values
//! go into a separate [`crate::args::BoundArgs`] map, never back into the
//! schema.

use std::fmt;
use std::sync::Arc;

use crate::args::bound::ArgValue;

/// Value-kind tag used for grammar generation and post-parse validation.
///
/// The kind selects the coercion applied to raw CLI tokens. `Raw` is the
/// escape hatch that disables typed coercion entirely: the token is
/// captured as a plain string no matter what the argument declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Str,
    Int,
    Float,
    Bool,
    Path,
    Raw,
}

impl ArgKind {
    /// Short lowercase name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ArgKind::Str => "str",
            ArgKind::Int => "int",
            ArgKind::Float => "float",
            ArgKind::Bool => "bool",
            ArgKind::Path => "path",
            ArgKind::Raw => "raw",
        }
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the grammar engine does when the argument appears on the command
/// line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArgAction {
    /// Consume and store the following value token(s). The default.
    #[default]
    Store,
    /// Zero-argument flag, binds `true` when present.
    StoreTrue,
    /// Zero-argument flag, binds the number of occurrences.
    Count,
}

/// How many value tokens the argument consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    Exactly(usize),
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl Nargs {
    /// Whether the cardinality produces a list value.
    pub fn is_multiple(&self) -> bool {
        match self {
            Nargs::Exactly(n) => *n > 1,
            Nargs::ZeroOrOne => false,
            Nargs::ZeroOrMore | Nargs::OneOrMore => true,
        }
    }
}

/// Escape hatch for merging arbitrary backend-specific settings into the
/// generated `clap::Arg`, applied verbatim after everything the schema
/// maps itself.
pub type ClapExtras = Arc<dyn Fn(clap::Arg) -> clap::Arg + Send + Sync>;

/// Declaration of one command-line argument.
///
/// An argument is optional (a flag) if and only if at least one of its
/// names carries the `-` prefix; otherwise it is positional and
/// unconditionally required. A positional spec must never declare
/// `required = false` -- the grammar generator rejects that combination.
///
/// Specs are built once per module definition and shared read-only from
/// then on.
#[derive(Clone)]
pub struct ArgSpec {
    names: Vec<String>,
    kind: ArgKind,
    action: ArgAction,
    nargs: Option<Nargs>,
    const_value: Option<ArgValue>,
    default: Option<ArgValue>,
    choices: Option<Vec<String>>,
    required: Option<bool>,
    help: Option<String>,
    metavar: Option<String>,
    parse_kind: Option<ArgKind>,
    clap_extras: Option<ClapExtras>,
}

impl ArgSpec {
    /// Create a spec with the given names and declared value kind.
    pub fn new<I, S>(names: I, kind: ArgKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            kind,
            action: ArgAction::default(),
            nargs: None,
            const_value: None,
            default: None,
            choices: None,
            required: None,
            help: None,
            metavar: None,
            parse_kind: None,
            clap_extras: None,
        }
    }

    pub fn with_action(mut self, action: ArgAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn with_const(mut self, value: ArgValue) -> Self {
        self.const_value = Some(value);
        self
    }

    pub fn with_default(mut self, value: ArgValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    /// Override the kind used for token coercion at parse time, leaving
    /// the declared kind untouched for post-parse validation.
    pub fn with_parse_kind(mut self, kind: ArgKind) -> Self {
        self.parse_kind = Some(kind);
        self
    }

    pub fn with_clap_extras(
        mut self,
        extras: impl Fn(clap::Arg) -> clap::Arg + Send + Sync + 'static,
    ) -> Self {
        self.clap_extras = Some(Arc::new(extras));
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    pub fn action(&self) -> ArgAction {
        self.action
    }

    pub fn nargs(&self) -> Option<Nargs> {
        self.nargs
    }

    pub fn const_value(&self) -> Option<&ArgValue> {
        self.const_value.as_ref()
    }

    pub fn default(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }

    pub fn choices(&self) -> Option<&[String]> {
        self.choices.as_deref()
    }

    pub fn required(&self) -> Option<bool> {
        self.required
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn metavar(&self) -> Option<&str> {
        self.metavar.as_deref()
    }

    pub fn parse_kind(&self) -> Option<ArgKind> {
        self.parse_kind
    }

    pub fn clap_extras(&self) -> Option<&ClapExtras> {
        self.clap_extras.as_ref()
    }

    /// The kind used for token coercion: the parse-time override when
    /// present, the declared kind otherwise.
    pub fn effective_kind(&self) -> ArgKind {
        self.parse_kind.unwrap_or(self.kind)
    }

    /// An argument is a flag iff any of its names carries the `-` prefix.
    pub fn is_flag(&self) -> bool {
        self.names.iter().any(|name| name.starts_with('-'))
    }
}

impl fmt::Debug for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgSpec")
            .field("names", &self.names)
            .field("kind", &self.kind)
            .field("action", &self.action)
            .field("nargs", &self.nargs)
            .field("const_value", &self.const_value)
            .field("default", &self.default)
            .field("choices", &self.choices)
            .field("required", &self.required)
            .field("help", &self.help)
            .field("metavar", &self.metavar)
            .field("parse_kind", &self.parse_kind)
            .field("clap_extras", &self.clap_extras.is_some())
            .finish()
    }
}

/// Ordered, keyed collection of argument specs belonging to one module.
///
/// Keys are the names modules use to look their own values up after
/// parsing. Insertion order is significant: it fixes the order of
/// positional arguments in the generated grammar. Keys must be unique
/// within a set; the registry validates this at plugin registration.
#[derive(Debug, Clone, Default)]
pub struct ArgSet {
    entries: Vec<(String, ArgSpec)>,
}

impl ArgSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyed spec, preserving insertion order.
    pub fn with(mut self, key: impl Into<String>, spec: ArgSpec) -> Self {
        self.entries.push((key.into(), spec));
        self
    }

    pub fn get(&self, key: &str) -> Option<&ArgSpec> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgSpec)> {
        self.entries.iter().map(|(k, spec)| (k.as_str(), spec))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
