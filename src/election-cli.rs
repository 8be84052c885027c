//! Offline admin tool for the student election.
//! Operates directly on the election data file used by the server.

use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use student_election::{
    error::Error,
    model::{election::ElectionStatus, store::Store},
};

const PROGRAM_NAME: &str = "election-cli";

const ABOUT_TEXT: &str = "Administer a student election data file.

EXIT CODES:
     0: Success.
     1: Error.";

const DATA_PATH: &str = "DATA_PATH";
const NAMES_PATH: &str = "NAMES_PATH";

const DEFAULT_DATA_PATH: &str = "data/election.json";

const NAMES_PATH_HELP: &str = "A text file with one voter name per line.\n\
Blank lines and lines starting with `#` are ignored.";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .subcommand_required(true)
        .arg(
            Arg::new(DATA_PATH)
                .long("data")
                .help("The election data file")
                .action(ArgAction::Set)
                .value_parser(value_parser!(PathBuf))
                .default_value(DEFAULT_DATA_PATH)
                .global(true),
        )
        .subcommand(
            Command::new("import-voters")
                .about("Register every name in a file as a voter, printing their codes")
                .arg(
                    Arg::new(NAMES_PATH)
                        .help(NAMES_PATH_HELP)
                        .action(ArgAction::Set)
                        .value_parser(value_parser!(PathBuf))
                        .required(true),
                ),
        )
        .subcommand(Command::new("voters").about("List registered voters and their codes"))
        .subcommand(Command::new("status").about("Show the election schedule and status"))
        .subcommand(Command::new("results").about("Show the current tallies"))
}

/// Names listed in a voter file.
fn parse_names(contents: &str) -> Vec<&str> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

fn import_voters(store: &Store, names_path: &Path) -> Result<String, Error> {
    let contents = fs::read_to_string(names_path).map_err(|e| {
        Error::Validation(format!("Failed to read {}: {e}", names_path.display()))
    })?;
    let existing: HashSet<_> = store.users().into_iter().map(|v| v.id).collect();
    let result = store.add_voters(parse_names(&contents))?;

    let mut out = format!(
        "Added {} voters, skipped {}.\n",
        result.added_count, result.skipped_count
    );
    for voter in result.voters.iter().filter(|v| !existing.contains(&v.id)) {
        let _ = writeln!(out, "{}: {}", voter.name, voter.code);
    }
    Ok(out)
}

fn list_voters(store: &Store) -> String {
    let voters = store.users();
    let mut out = format!("{} voters registered.\n", voters.len());
    for voter in voters {
        let voted = if voter.has_voted { "voted" } else { "not voted" };
        let _ = writeln!(out, "{}: {} ({voted})", voter.name, voter.code);
    }
    out
}

fn status(store: &Store) -> String {
    let desc = store.election_status();
    let mut out = format!("The election is {}.\n", desc.status);
    if let (Some(start), Some(end)) = (desc.start, desc.end) {
        let _ = writeln!(out, "Voting window: {start} to {end}");
    }
    out
}

fn results(store: &Store) -> String {
    let results = store.results();
    let mut out = String::new();
    for tally in &results.candidates {
        let count = tally.vote_count;
        let _ = writeln!(
            out,
            "{}: {count} vote{}",
            tally.candidate.name,
            if count != 1 { "s" } else { "" }
        );
    }
    let _ = writeln!(
        out,
        "{} of {} voters voted ({:.1}% turnout).",
        results.total_votes,
        results.total_voters,
        results.turnout * 100.0
    );
    if results.status == ElectionStatus::Ended {
        if results.winners.is_empty() {
            let _ = writeln!(out, "No winner: no votes were cast.");
        } else {
            let names: Vec<_> = results.winners.iter().map(|w| w.name.as_str()).collect();
            let _ = writeln!(out, "Winner: {}", names.join(", "));
        }
    }
    out
}

/// Run the requested subcommand, report the result, and return the exit code.
fn run(args: &ArgMatches) -> u8 {
    // Unwrap safe since the argument has a default.
    let data_path: &PathBuf = args.get_one(DATA_PATH).unwrap();
    let store = Store::open(data_path);

    let output = match args.subcommand() {
        Some(("import-voters", sub_args)) => {
            // Required argument is guaranteed to be present.
            let names_path: &PathBuf = sub_args.get_one(NAMES_PATH).unwrap();
            import_voters(&store, names_path)
        }
        Some(("voters", _)) => Ok(list_voters(&store)),
        Some(("status", _)) => Ok(status(&store)),
        Some(("results", _)) => Ok(results(&store)),
        _ => unreachable!("a subcommand is required"),
    };

    match output {
        Ok(text) => {
            print!("{text}");
            0
        }
        Err(err) => {
            println!("Error: {err}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
