//! Command grammar generation.
//!
//! Walks every registered plugin and produces the `clap` command for one
//! boot: three global options, one subcommand per namespaced module name,
//! and one `clap::Arg` per key of each module's argument schema. The
//! translation is mechanical; everything the schema cannot express goes
//! through the per-spec `clap_extras` escape hatch, merged in last.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{value_parser, Arg, Command};

use crate::args::{ArgAction, ArgKind, ArgSpec, Nargs};
use crate::error::{ClyjinError, Result};
use crate::plugins::PluginRegistry;

/// Namespace ids of the global options in the parsed matches.
pub(crate) const VERBOSITY_ARG: &str = "verbosity_level";
pub(crate) const CONFIG_ARG: &str = "config_path";
pub(crate) const SYSDIR_ARG: &str = "sysdir";

/// Build the full command grammar for the given registry.
pub fn generate_command(registry: &PluginRegistry) -> Result<Command> {
    let mut command = Command::new("clyjin")
        .about("System configuration toolbox")
        .subcommand_required(true)
        .arg(
            Arg::new(VERBOSITY_ARG)
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .global(true)
                .help("verbosity level"),
        )
        .arg(
            Arg::new(CONFIG_ARG)
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("path to config file. Defaults to `clyjin.yml` in current dir"),
        )
        .arg(
            Arg::new(SYSDIR_ARG)
                .long("sysdir")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("directory for clyjin global state. Defaults to `$HOME/.clyjin`"),
        );

    for plugin in registry.plugins() {
        for module in plugin.module_specs()? {
            let mut subcommand = Command::new(plugin.namespaced_module_name(module)?);
            if let Some(description) = module.description() {
                subcommand = subcommand.about(description.to_string());
            }
            if let Some(args) = module.args() {
                for (key, spec) in args.iter() {
                    subcommand = subcommand.arg(generate_arg(key, spec)?);
                }
            }
            command = command.subcommand(subcommand);
        }
    }

    Ok(command)
}

/// Translate one argument spec into a `clap::Arg`.
///
/// Flags receive their short/long spellings from the declared names;
/// positionals keep the schema's insertion order. For the zero-argument
/// `StoreTrue` and `Count` actions, cardinality, constant, choices and
/// metavar are dropped -- they are meaningless without a value token.
fn generate_arg(key: &str, spec: &ArgSpec) -> Result<Arg> {
    let mut arg = Arg::new(key.to_string());
    let is_flag = spec.is_flag();

    if is_flag {
        for name in spec.names() {
            if let Some(long) = name.strip_prefix("--") {
                arg = arg.long(long.to_string());
            } else if let Some(short) = name.strip_prefix('-') {
                if let Some(c) = short.chars().next() {
                    arg = arg.short(c);
                }
            }
        }
    } else if spec.required() == Some(false) {
        // Positionals are unconditionally mandatory.
        return Err(ClyjinError::NonRequiredPositional {
            arg: key.to_string(),
        });
    }

    match spec.action() {
        ArgAction::StoreTrue => {
            arg = arg.action(clap::ArgAction::SetTrue);
        }
        ArgAction::Count => {
            arg = arg.action(clap::ArgAction::Count);
        }
        ArgAction::Store => {
            arg = arg.action(clap::ArgAction::Set);

            arg = match (spec.choices(), spec.effective_kind()) {
                (Some(choices), _) => arg.value_parser(PossibleValuesParser::new(choices.to_vec())),
                (None, ArgKind::Int) => arg.value_parser(value_parser!(i64)),
                (None, ArgKind::Float) => arg.value_parser(value_parser!(f64)),
                (None, ArgKind::Bool) => arg.value_parser(value_parser!(bool)),
                (None, ArgKind::Path) => arg.value_parser(value_parser!(PathBuf)),
                (None, ArgKind::Str) => arg.value_parser(value_parser!(String)),
                // Raw delegates to clap's plain string capture.
                (None, ArgKind::Raw) => arg,
            };

            if let Some(nargs) = spec.nargs() {
                arg = match nargs {
                    Nargs::Exactly(n) => arg.num_args(n),
                    Nargs::ZeroOrOne => arg.num_args(0..=1),
                    Nargs::ZeroOrMore => arg.num_args(0..),
                    Nargs::OneOrMore => arg.num_args(1..),
                };
            }

            if let Some(default) = spec.default() {
                arg = match default {
                    crate::args::ArgValue::List(items) => arg.default_values(
                        items
                            .iter()
                            .map(|item| item.to_cli_token())
                            .collect::<Vec<_>>(),
                    ),
                    single => arg.default_value(single.to_cli_token()),
                };
            }

            if let Some(const_value) = spec.const_value() {
                arg = arg.default_missing_value(const_value.to_cli_token());
            }

            if let Some(metavar) = spec.metavar() {
                arg = arg.value_name(metavar.to_string());
            }

            if !is_flag {
                // Requiredness is never declared for positionals; it
                // follows from the absence of a default or an optional
                // cardinality.
                let optional = spec.default().is_some()
                    || matches!(spec.nargs(), Some(Nargs::ZeroOrOne) | Some(Nargs::ZeroOrMore));
                arg = arg.required(!optional);
            }
        }
    }

    if is_flag {
        if let Some(required) = spec.required() {
            arg = arg.required(required);
        }
    }

    if let Some(help) = spec.help() {
        arg = arg.help(help.to_string());
    }

    if let Some(extras) = spec.clap_extras() {
        arg = extras(arg);
    }

    Ok(arg)
}
