use std::io::{stdin, stdout, Write};

use cmdchain_core::error::Result;

/// Represents the user's choice when confirming a pipeline run.
#[derive(PartialEq, Eq, Debug)]
pub enum RunChoice {
    Yes,
    No,
}

/// Interprets one answer to the confirmation prompt. An empty answer is yes.
#[must_use]
pub fn parse_run_choice(input: &str) -> Option<RunChoice> {
    match input.trim().to_lowercase().as_str() {
        "" | "y" | "yes" => Some(RunChoice::Yes),
        "n" | "no" => Some(RunChoice::No),
        _ => None,
    }
}

/// Confirms with the user whether the pipeline should be run
pub fn confirm_command_should_run() -> Result<RunChoice> {
    loop {
        print!("Are you sure you want to run? ([Y]es/[n]o): ");
        stdout().flush()?;

        let mut input = String::new();
        stdin().read_line(&mut input)?;

        if let Some(choice) = parse_run_choice(&input) {
            return Ok(choice);
        }
    }
}
