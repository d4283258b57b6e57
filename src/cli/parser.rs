//! CLI input parsing and argument binding.
//!
//! A [`CliParser`] builds its grammar once from the registry and can then
//! parse any number of raw argument lists against it. Tokenization
//! failures (unknown flags, wrong arity, missing values) and the help
//! path are clap's own territory: the resulting `clap::Error` propagates
//! untouched inside [`ClyjinError::Cli`] and is finished with
//! `clap::Error::exit` at the binary boundary.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::{ArgMatches, MatchesError};
use clap::Command;

use crate::args::{ArgAction, ArgKind, ArgSet, ArgSpec, ArgValue, BoundArgs};
use crate::cli::generator::{generate_command, CONFIG_ARG, SYSDIR_ARG, VERBOSITY_ARG};
use crate::cli::invocation::Invocation;
use crate::error::{ClyjinError, Result};
use crate::plugins::PluginRegistry;

/// Parses raw CLI input into a resolved [`Invocation`].
pub struct CliParser<'r> {
    registry: &'r PluginRegistry,
    command: Command,
}

impl<'r> CliParser<'r> {
    /// Build the grammar for the registry. The grammar is generated once
    /// and reused for every parse done through this parser.
    pub fn new(registry: &'r PluginRegistry) -> Result<Self> {
        Ok(Self {
            registry,
            command: generate_command(registry)?,
        })
    }

    /// Parse the process's own arguments.
    pub fn parse(&self) -> Result<Invocation<'r>> {
        let matches = self
            .command
            .clone()
            .try_get_matches_from(std::env::args_os())?;
        self.resolve_matches(matches)
    }

    /// Parse an explicit argument list, given without the binary name.
    pub fn parse_from<I, T>(&self, raw: I) -> Result<Invocation<'r>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut argv: Vec<OsString> = vec![OsString::from("clyjin")];
        argv.extend(raw.into_iter().map(Into::into));
        let matches = self.command.clone().try_get_matches_from(argv)?;
        self.resolve_matches(matches)
    }

    fn resolve_matches(&self, matches: ArgMatches) -> Result<Invocation<'r>> {
        let (token, sub_matches) = matches.subcommand().ok_or_else(|| {
            ClyjinError::Internal("tokenization succeeded without a subcommand".to_string())
        })?;

        let (plugin, module) = self.registry.resolve(token)?;

        let args = match module.args() {
            None => None,
            Some(set) => Some(bind_args(set, sub_matches)?),
        };

        // Global options propagate into the subcommand matches wherever
        // they appeared on the command line.
        let config_path = sub_matches.get_one::<PathBuf>(CONFIG_ARG).cloned();
        let verbosity_level = sub_matches.get_count(VERBOSITY_ARG);
        let sysdir = sub_matches.get_one::<PathBuf>(SYSDIR_ARG).cloned();

        Ok(Invocation {
            plugin,
            module,
            args,
            config_path,
            verbosity_level,
            sysdir,
        })
    }
}

/// Bind the parsed matches back onto the schema keys.
///
/// Every key of the declared set must be known to the matches; grammar
/// generation guarantees this, so an unknown key is a framework bug
/// surfaced as [`ClyjinError::SchemaDesync`], never a user error. Values
/// are checked permissively against the declared kind; "not supplied" is
/// written through unchanged for the module to handle at execution time.
fn bind_args(set: &ArgSet, matches: &ArgMatches) -> Result<BoundArgs> {
    let mut bound = BoundArgs::new();
    for (key, spec) in set.iter() {
        let value = extract_value(matches, key, spec)?;
        if let Some(v) = &value {
            if !v.satisfies(spec.kind()) {
                return Err(ClyjinError::TypeMismatch {
                    key: key.to_string(),
                    expected: spec.kind(),
                    actual: v.kind_name().to_string(),
                });
            }
        }
        bound.bind(key, value);
    }
    Ok(bound)
}

/// Pull one argument's value out of the matches, shaped by its action,
/// cardinality, and effective kind.
fn extract_value(
    matches: &ArgMatches,
    key: &str,
    spec: &ArgSpec,
) -> Result<Option<ArgValue>> {
    match spec.action() {
        ArgAction::StoreTrue => Ok(one::<bool>(matches, key)?.map(ArgValue::Bool)),
        ArgAction::Count => Ok(one::<u8>(matches, key)?.map(|n| ArgValue::Int(i64::from(n)))),
        ArgAction::Store => {
            let kind = spec.effective_kind();
            let multiple = spec.nargs().is_some_and(|nargs| nargs.is_multiple());

            if spec.choices().is_some() {
                // Choice sets are matched as strings by the grammar and
                // coerced here through the kind table.
                if multiple {
                    let Some(tokens) = many::<String>(matches, key)? else {
                        return Ok(None);
                    };
                    let items = tokens
                        .iter()
                        .map(|token| coerce_token(token, kind, key))
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Some(ArgValue::List(items)))
                } else {
                    one::<String>(matches, key)?
                        .map(|token| coerce_token(&token, kind, key))
                        .transpose()
                }
            } else if multiple {
                Ok(match kind {
                    ArgKind::Int => many::<i64>(matches, key)?
                        .map(|items| ArgValue::List(items.into_iter().map(ArgValue::Int).collect())),
                    ArgKind::Float => many::<f64>(matches, key)?.map(|items| {
                        ArgValue::List(items.into_iter().map(ArgValue::Float).collect())
                    }),
                    ArgKind::Bool => many::<bool>(matches, key)?.map(|items| {
                        ArgValue::List(items.into_iter().map(ArgValue::Bool).collect())
                    }),
                    ArgKind::Path => many::<PathBuf>(matches, key)?.map(|items| {
                        ArgValue::List(items.into_iter().map(ArgValue::Path).collect())
                    }),
                    ArgKind::Str | ArgKind::Raw => many::<String>(matches, key)?.map(|items| {
                        ArgValue::List(items.into_iter().map(ArgValue::Str).collect())
                    }),
                })
            } else {
                Ok(match kind {
                    ArgKind::Int => one::<i64>(matches, key)?.map(ArgValue::Int),
                    ArgKind::Float => one::<f64>(matches, key)?.map(ArgValue::Float),
                    ArgKind::Bool => one::<bool>(matches, key)?.map(ArgValue::Bool),
                    ArgKind::Path => one::<PathBuf>(matches, key)?.map(ArgValue::Path),
                    ArgKind::Str | ArgKind::Raw => one::<String>(matches, key)?.map(ArgValue::Str),
                })
            }
        }
    }
}

/// Coercion table for string tokens, used where the grammar captured a
/// plain string (choice sets).
fn coerce_token(token: &str, kind: ArgKind, key: &str) -> Result<ArgValue> {
    let mismatch = || ClyjinError::TypeMismatch {
        key: key.to_string(),
        expected: kind,
        actual: format!("<{token}>"),
    };
    match kind {
        ArgKind::Str | ArgKind::Raw => Ok(ArgValue::Str(token.to_string())),
        ArgKind::Int => token.parse::<i64>().map(ArgValue::Int).map_err(|_| mismatch()),
        ArgKind::Float => token
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|_| mismatch()),
        ArgKind::Bool => match token {
            "true" | "1" => Ok(ArgValue::Bool(true)),
            "false" | "0" => Ok(ArgValue::Bool(false)),
            _ => Err(mismatch()),
        },
        ArgKind::Path => Ok(ArgValue::Path(PathBuf::from(token))),
    }
}

fn one<T>(matches: &ArgMatches, key: &str) -> Result<Option<T>>
where
    T: Clone + Send + Sync + 'static,
{
    match matches.try_get_one::<T>(key) {
        Ok(value) => Ok(value.cloned()),
        Err(MatchesError::UnknownArgument { .. }) => Err(ClyjinError::SchemaDesync {
            key: key.to_string(),
        }),
        Err(e) => Err(ClyjinError::Internal(format!("argument <{key}>: {e}"))),
    }
}

fn many<T>(matches: &ArgMatches, key: &str) -> Result<Option<Vec<T>>>
where
    T: Clone + Send + Sync + 'static,
{
    match matches.try_get_many::<T>(key) {
        Ok(values) => Ok(values.map(|items| items.cloned().collect())),
        Err(MatchesError::UnknownArgument { .. }) => Err(ClyjinError::SchemaDesync {
            key: key.to_string(),
        }),
        Err(e) => Err(ClyjinError::Internal(format!("argument <{key}>: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use clap::error::ErrorKind;

    use crate::args::Nargs;
    use crate::plugins::types::{Module, ModuleData, ModuleFactory, ModuleSpec, PluginSpec};

    struct NoopModule;

    #[async_trait]
    impl Module for NoopModule {
        async fn execute(&self) -> Result<()> {
            Ok(())
        }
    }

    struct NoopFactory;

    impl ModuleFactory for NoopFactory {
        fn create(&self, _data: ModuleData) -> Box<dyn Module> {
            Box::new(NoopModule)
        }
    }

    /// Registry with one plugin `mymodule` whose root module takes a
    /// required positional `name` and an optional `--count` (int,
    /// default 3).
    fn example_registry() -> PluginRegistry {
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new()
                .with("name", ArgSpec::new(["name"], ArgKind::Str))
                .with(
                    "count",
                    ArgSpec::new(["--count"], ArgKind::Int).with_default(ArgValue::Int(3)),
                ),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("mymodule", None, vec![root]))
            .unwrap();
        registry
    }

    #[test]
    fn test_positional_bound_and_default_applied() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser.parse_from(["mymodule", "alice"]).unwrap();
        let args = invocation.args.unwrap();
        assert_eq!(args.get("name").unwrap(), &ArgValue::Str("alice".to_string()));
        assert_eq!(args.get("count").unwrap(), &ArgValue::Int(3));
    }

    #[test]
    fn test_supplied_flag_overrides_default() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser
            .parse_from(["mymodule", "alice", "--count", "7"])
            .unwrap();
        let args = invocation.args.unwrap();
        assert_eq!(args.get("count").unwrap(), &ArgValue::Int(7));
    }

    #[test]
    fn test_parser_is_reusable_across_parses() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let first = parser.parse_from(["mymodule", "alice"]).unwrap();
        let second = parser.parse_from(["mymodule", "bob"]).unwrap();
        assert_eq!(
            first.args.unwrap().get("name").unwrap(),
            &ArgValue::Str("alice".to_string())
        );
        assert_eq!(
            second.args.unwrap().get("name").unwrap(),
            &ArgValue::Str("bob".to_string())
        );
    }

    #[test]
    fn test_help_flag_takes_the_engine_exit_path() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let err = parser.parse_from(["-h"]).unwrap_err();
        match err {
            ClyjinError::Cli(cli_err) => assert_eq!(cli_err.kind(), ErrorKind::DisplayHelp),
            other => panic!("expected engine help exit, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_required_positional_is_a_usage_error() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let err = parser.parse_from(["mymodule"]).unwrap_err();
        assert!(matches!(err, ClyjinError::Cli(_)));
    }

    #[test]
    fn test_unknown_subcommand_is_a_usage_error() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let err = parser.parse_from(["missing"]).unwrap_err();
        assert!(matches!(err, ClyjinError::Cli(_)));
    }

    #[test]
    fn test_global_options_before_subcommand() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser
            .parse_from(["-vv", "--config", "custom.yml", "mymodule", "alice"])
            .unwrap();
        assert_eq!(invocation.verbosity_level, 2);
        assert_eq!(invocation.config_path, Some(PathBuf::from("custom.yml")));
        assert_eq!(invocation.sysdir, None);
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let registry = example_registry();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser
            .parse_from(["mymodule", "alice", "-v", "--sysdir", "/tmp/state"])
            .unwrap();
        assert_eq!(invocation.verbosity_level, 1);
        assert_eq!(invocation.sysdir, Some(PathBuf::from("/tmp/state")));
    }

    #[test]
    fn test_module_without_schema_has_no_args() {
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new(
                "bare",
                None,
                vec![ModuleSpec::new("_root", Arc::new(NoopFactory))],
            ))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser.parse_from(["bare"]).unwrap();
        assert!(invocation.args.is_none());
    }

    #[test]
    fn test_store_true_flag_binding() {
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new().with(
                "force",
                ArgSpec::new(["--force"], ArgKind::Bool).with_action(ArgAction::StoreTrue),
            ),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("demo", None, vec![root]))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let with_flag = parser.parse_from(["demo", "--force"]).unwrap();
        assert_eq!(
            with_flag.args.unwrap().get("force").unwrap(),
            &ArgValue::Bool(true)
        );

        let without_flag = parser.parse_from(["demo"]).unwrap();
        assert_eq!(
            without_flag.args.unwrap().get("force").unwrap(),
            &ArgValue::Bool(false)
        );
    }

    #[test]
    fn test_one_or_more_positional_binds_a_list() {
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new().with(
                "module_classpath",
                ArgSpec::new(["module_classpath"], ArgKind::Str)
                    .with_nargs(Nargs::OneOrMore)
                    .with_parse_kind(ArgKind::Raw),
            ),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("demo", None, vec![root]))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser.parse_from(["demo", "a.py:A", "b.py:B"]).unwrap();
        let args = invocation.args.unwrap();
        assert_eq!(
            args.get("module_classpath").unwrap(),
            &ArgValue::List(vec![
                ArgValue::Str("a.py:A".to_string()),
                ArgValue::Str("b.py:B".to_string()),
            ])
        );
    }

    #[test]
    fn test_optional_flag_without_default_is_written_through_unset() {
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new().with("out", ArgSpec::new(["--out"], ArgKind::Path)),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("demo", None, vec![root]))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser.parse_from(["demo"]).unwrap();
        let args = invocation.args.unwrap();
        assert!(args.contains("out"));
        assert!(args.get_opt("out").is_none());
        assert!(matches!(
            args.get("out"),
            Err(ClyjinError::UnsetValue { .. })
        ));
    }

    #[test]
    fn test_choice_set_coerced_through_kind_table() {
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new().with(
                "level",
                ArgSpec::new(["--level"], ArgKind::Int)
                    .with_choices(["1", "2", "3"])
                    .with_default(ArgValue::Int(1)),
            ),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("demo", None, vec![root]))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let invocation = parser.parse_from(["demo", "--level", "2"]).unwrap();
        assert_eq!(
            invocation.args.unwrap().get("level").unwrap(),
            &ArgValue::Int(2)
        );

        let err = parser.parse_from(["demo", "--level", "9"]).unwrap_err();
        assert!(matches!(err, ClyjinError::Cli(_)));
    }

    #[test]
    fn test_raw_parse_kind_conflicting_with_declared_kind_is_a_mismatch() {
        // Raw capture yields a string; a declared int cannot accept it.
        let root = ModuleSpec::new("_root", Arc::new(NoopFactory)).with_args(
            ArgSet::new().with(
                "count",
                ArgSpec::new(["--count"], ArgKind::Int).with_parse_kind(ArgKind::Raw),
            ),
        );
        let mut registry = PluginRegistry::new();
        registry
            .register(PluginSpec::new("demo", None, vec![root]))
            .unwrap();
        let parser = CliParser::new(&registry).unwrap();

        let err = parser.parse_from(["demo", "--count", "7"]).unwrap_err();
        assert!(matches!(
            err,
            ClyjinError::TypeMismatch { key, .. } if key == "count"
        ));
    }

    #[test]
    fn test_schema_desync_is_distinct_from_user_errors() {
        // A schema key the generated grammar never saw: bind directly
        // against matches produced from a mismatched grammar.
        let command = clap::Command::new("clyjin").arg(clap::Arg::new("known"));
        let matches = command.try_get_matches_from(["clyjin", "value"]).unwrap();

        let set = ArgSet::new().with("unknown", ArgSpec::new(["unknown"], ArgKind::Str));
        let err = bind_args(&set, &matches).unwrap_err();
        assert!(matches!(
            err,
            ClyjinError::SchemaDesync { key } if key == "unknown"
        ));
    }
}
