use std::io::Read;
use std::time::Duration;

use clap::{ArgAction, ArgGroup, Parser};

use super::error::DriverError;
use crate::runtime::ExecutionBudget;
use crate::validator::StepExpectation;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
#[clap(group(ArgGroup::new("input").args(&["file", "inline", "stdin"])))]
pub struct Config {
    /// Optionally output tokens to stdout or to a file if provided
    #[clap(short = 't', long = "tokens-output", requires = "input")]
    pub tokens_output_path: Option<Option<String>>,

    /// Optionally output the program listing to stdout or to a file if provided
    #[clap(short = 'p', long = "program-output", requires = "input")]
    pub program_output_path: Option<Option<String>>,

    /// Optionally read program as an arg
    #[clap(short, long, conflicts_with_all = &["file", "stdin"])]
    pub inline: Option<String>,

    /// Optionally read program from stdin
    #[clap(short, long, conflicts_with_all = &["file", "inline"])]
    pub stdin: bool,

    /// Don't execute the program only compile it.
    #[clap(short = 'd', long)]
    pub dry_run: bool,

    /// Instruction ceiling for one run
    #[clap(long)]
    pub max_instructions: Option<u64>,

    /// Wall-clock ceiling for one run, in milliseconds
    #[clap(long)]
    pub time_limit_ms: Option<u64>,

    /// Stack depth ceiling for one run
    #[clap(long)]
    pub max_stack: Option<usize>,

    /// Output ceiling for one run, in bytes
    #[clap(long)]
    pub max_output: Option<usize>,

    /// Check that the printed lines equal this text
    #[clap(long, requires = "input", conflicts_with = "expect_contains")]
    pub expect: Option<String>,

    /// Check that the printed lines contain this text
    #[clap(long, requires = "input")]
    pub expect_contains: Option<String>,

    /// Log more (-v for debug, -vv for trace)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// File to be run (exclude for repl)
    pub file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tokens_output_path: None,
            program_output_path: None,
            inline: None,
            stdin: false,
            dry_run: false,
            max_instructions: None,
            time_limit_ms: None,
            max_stack: None,
            max_output: None,
            expect: None,
            expect_contains: None,
            verbose: 0,
            file: None,
        }
    }
}

impl Config {
    pub fn get_source_path(&self) -> Option<String> {
        self.file.clone()
    }

    pub fn get_script(&mut self) -> Result<Option<String>, DriverError> {
        if self.inline.is_some() {
            return Ok(self.inline.take());
        }

        if self.stdin {
            let mut input = String::new();

            std::io::stdin()
                .read_to_string(&mut input)
                .map_err(|err| DriverError::Read {
                    path: "<stdin>".to_string(),
                    err,
                })?;

            return Ok(Some(input));
        }

        if let Some(path) = self.file.as_ref() {
            let source = std::fs::read_to_string(path).map_err(|err| DriverError::Read {
                path: path.clone(),
                err,
            })?;

            return Ok(Some(source));
        }

        Ok(None)
    }

    /// The default budget with any command line overrides applied.
    pub fn budget(&self) -> ExecutionBudget {
        let mut budget = ExecutionBudget::default();

        if let Some(max) = self.max_instructions {
            budget = budget.with_max_instructions(max);
        }

        if let Some(ms) = self.time_limit_ms {
            budget = budget.with_time_limit(Duration::from_millis(ms));
        }

        if let Some(max) = self.max_stack {
            budget = budget.with_max_stack_depth(max);
        }

        if let Some(max) = self.max_output {
            budget = budget.with_max_output_bytes(max);
        }

        budget
    }

    pub fn expectation(&self) -> Option<StepExpectation> {
        if let Some(text) = self.expect.as_ref() {
            return Some(StepExpectation::exact(text.as_str()));
        }

        self.expect_contains
            .as_ref()
            .map(|text| StepExpectation::contains(text.as_str()))
    }

    pub fn input_provided(&self) -> bool {
        self.inline.is_some() || self.stdin || self.file.is_some()
    }

    pub fn repl_mode(&self) -> bool {
        !self.input_provided()
    }
}

impl TryFrom<Vec<&str>> for Config {
    type Error = String;
    fn try_from(args: Vec<&str>) -> Result<Self, Self::Error> {
        match Config::try_parse_from(args) {
            Ok(config) => Ok(config),
            Err(e) => Err(e.to_string()),
        }
    }
}
