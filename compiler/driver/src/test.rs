use crate::cli::{self, Command, GlobalOptions};
use session::Pass;
use std::path::PathBuf;
use utility::paint::ColorChoice;

fn arguments(arguments: &[&str]) -> Result<(Command, GlobalOptions), clap::Error> {
    cli::command()
        .try_get_matches_from(arguments)
        .map(|matches| cli::deserialize(&matches))
}

#[test]
fn command_is_well_formed() {
    cli::command().debug_assert();
}

#[test]
fn check_with_options() {
    let (command, global_options) = arguments(&[
        "cadence",
        "check",
        "main.cad",
        "io.cad",
        "--emit-symbols",
        "--halt-after",
        "annotator",
    ])
    .unwrap();

    let Command::Check { paths, options } = command else {
        panic!("expected the check subcommand");
    };
    assert_eq!(paths, [PathBuf::from("main.cad"), PathBuf::from("io.cad")]);
    assert!(options.session.emit_symbols);
    assert!(!options.session.emit_ast);
    assert!(!options.verbose);
    assert_eq!(options.session.halt_after, Some(Pass::Annotator));
    assert_eq!(global_options.color, ColorChoice::Auto);
    assert!(!global_options.quiet);
}

#[test]
fn check_requires_paths() {
    assert!(arguments(&["cadence", "check"]).is_err());
}

#[test]
fn unknown_pass() {
    assert!(arguments(&["cadence", "check", "main.cad", "--halt-after", "typer"]).is_err());
}

#[test]
fn global_options_follow_the_subcommand() {
    let (command, global_options) =
        arguments(&["cadence", "explain", "E020", "e001", "--color", "never", "-q"]).unwrap();

    let Command::Explain { codes } = command else {
        panic!("expected the explain subcommand");
    };
    assert_eq!(codes, ["E020", "e001"]);
    assert_eq!(global_options.color, ColorChoice::Never);
    assert!(global_options.quiet);
}
