use clap::{
    builder::{PossibleValue, TypedValueParser, ValueParser},
    Arg, ArgAction, ArgMatches,
};
use session::{Options, Pass};
use std::{ffi::OsStr, path::PathBuf};
use utility::{paint::ColorChoice, QuoteExt};

pub(crate) fn arguments() -> (Command, GlobalOptions) {
    deserialize(&command().get_matches())
}

pub(crate) fn command() -> clap::Command {
    let flag = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name.replace('_', "-"))
            .action(ArgAction::SetTrue)
            .help(help)
    };

    clap::Command::new("cadence")
        .bin_name("cadence")
        .version(env!("CARGO_PKG_VERSION"))
        .about("The front end of the Cadence programming language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args([
            Arg::new(option::QUIET)
                .long("quiet")
                .short('q')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Suppress status output from being printed to stdout"),
            Arg::new(option::COLOR)
                .long("color")
                .global(true)
                .value_name("WHEN")
                .value_parser(ColorChoiceParser)
                .help("Control when to use color"),
        ])
        .subcommands([
            clap::Command::new(subcommand::CHECK)
                .visible_alias("c")
                .about("Check the given source files and the files they load for errors")
                .args([
                    Arg::new(argument::PATHS)
                        .action(ArgAction::Append)
                        .required(true)
                        .value_parser(ValueParser::path_buf())
                        .help("The paths to the source files"),
                    flag(option::EMIT_TOKENS, "Print the tokens of each file"),
                    flag(option::EMIT_AST, "Print the syntax tree of each file"),
                    flag(
                        option::EMIT_SYMBOLS,
                        "Print the symbol table after the last pass that ran",
                    ),
                    flag(option::TIMING, "Print the time spent in each pass"),
                    flag(option::VERBOSE, "Print progress information").short('v'),
                    Arg::new(option::HALT_AFTER)
                        .long("halt-after")
                        .value_name("PASS")
                        .value_parser(PassParser)
                        .help("Halt after the given pass"),
                ]),
            clap::Command::new(subcommand::EXPLAIN)
                .about("Explain the given error codes")
                .arg(
                    Arg::new(argument::CODES)
                        .action(ArgAction::Append)
                        .required(true)
                        .help("The error codes that need explanation"),
                ),
        ])
}

pub(crate) fn deserialize(matches: &ArgMatches) -> (Command, GlobalOptions) {
    let command = match matches.subcommand() {
        Some((subcommand::CHECK, matches)) => Command::Check {
            paths: matches
                .get_many::<PathBuf>(argument::PATHS)
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
            options: CheckOptions::deserialize(matches),
        },
        Some((subcommand::EXPLAIN, matches)) => Command::Explain {
            codes: matches
                .get_many::<String>(argument::CODES)
                .into_iter()
                .flatten()
                .cloned()
                .collect(),
        },
        _ => unreachable!(),
    };

    (command, GlobalOptions::deserialize(matches))
}

mod subcommand {
    pub(super) const CHECK: &str = "check";
    pub(super) const EXPLAIN: &str = "explain";
}

mod argument {
    pub(super) const CODES: &str = "CODES";
    pub(super) const PATHS: &str = "PATHS";
}

mod option {
    pub(super) const COLOR: &str = "color";
    pub(super) const EMIT_AST: &str = "emit_ast";
    pub(super) const EMIT_SYMBOLS: &str = "emit_symbols";
    pub(super) const EMIT_TOKENS: &str = "emit_tokens";
    pub(super) const HALT_AFTER: &str = "halt_after";
    pub(super) const QUIET: &str = "quiet";
    pub(super) const TIMING: &str = "timing";
    pub(super) const VERBOSE: &str = "verbose";
}

pub(crate) enum Command {
    Check {
        paths: Vec<PathBuf>,
        options: CheckOptions,
    },
    Explain {
        codes: Vec<String>,
    },
}

pub(crate) struct GlobalOptions {
    pub(crate) quiet: bool,
    pub(crate) color: ColorChoice,
}

impl GlobalOptions {
    fn deserialize(matches: &ArgMatches) -> Self {
        Self {
            quiet: matches.get_flag(option::QUIET),
            color: matches.get_one(option::COLOR).copied().unwrap_or_default(),
        }
    }
}

pub(crate) struct CheckOptions {
    pub(crate) session: Options,
    pub(crate) verbose: bool,
}

impl CheckOptions {
    fn deserialize(matches: &ArgMatches) -> Self {
        Self {
            session: Options {
                emit_tokens: matches.get_flag(option::EMIT_TOKENS),
                emit_ast: matches.get_flag(option::EMIT_AST),
                emit_symbols: matches.get_flag(option::EMIT_SYMBOLS),
                timing: matches.get_flag(option::TIMING),
                halt_after: matches.get_one(option::HALT_AFTER).copied(),
            },
            verbose: matches.get_flag(option::VERBOSE),
        }
    }
}

#[derive(Clone)]
struct ColorChoiceParser;

impl TypedValueParser for ColorChoiceParser {
    type Value = ColorChoice;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source.parse().map_err(|()| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("{} is not a valid color choice\n", source.quote()),
            )
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(
            ColorChoice::ELEMENTS
                .into_iter()
                .map(|choice| PossibleValue::new(choice.name())),
        ))
    }
}

#[derive(Clone)]
struct PassParser;

impl TypedValueParser for PassParser {
    type Value = Pass;

    fn parse_ref(
        &self,
        _: &clap::Command,
        _: Option<&Arg>,
        source: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let source = parse_utf8(source)?;

        source.parse().map_err(|()| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("{} is not a pass of the front end\n", source.quote()),
            )
        })
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue>>> {
        Some(Box::new(
            Pass::ELEMENTS
                .into_iter()
                .map(|pass| PossibleValue::new(pass.name())),
        ))
    }
}

fn parse_utf8(source: &OsStr) -> Result<&str, clap::Error> {
    source.to_str().ok_or_else(|| {
        clap::Error::raw(
            clap::error::ErrorKind::InvalidUtf8,
            format!("{} is not valid UTF-8\n", source.to_string_lossy().quote()),
        )
    })
}
