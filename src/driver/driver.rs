use super::config::Config;
use super::error::DriverError;

use crate::bytecode::Program;
use crate::engine::Engine;
use crate::parser::{parse, tokenize, Spanned, SyntaxError, Token};
use crate::repl::run_repl;
use crate::runtime::ExecutionTrace;
use crate::validator::{validate, ValidationResult};

use std::fs::File;
use std::io::Write;

use tracing::debug;

/// What a driver invocation ended with.
#[derive(Debug)]
pub enum Outcome {
    /// `--dry-run`: compiled, nothing executed
    Compiled(Program),
    Ran(ExecutionTrace),
    Checked(ValidationResult),
    Repl,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Compiled(_) | Outcome::Repl => 0,
            Outcome::Ran(trace) if trace.status.is_halted() => 0,
            Outcome::Ran(_) => 1,
            Outcome::Checked(result) if result.passed => 0,
            Outcome::Checked(_) => 1,
        }
    }
}

pub struct Driver {
    config: Config,
    engine: Engine,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        let engine = Engine::new(config.budget());

        Self { config, engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn run(&mut self) -> Result<Outcome, DriverError> {
        let stdout = std::io::stdout();

        self.run_with_output(&mut stdout.lock())
    }

    /// Runs the configured input, writing everything meant for the user to `out`.
    pub fn run_with_output(&mut self, out: &mut impl Write) -> Result<Outcome, DriverError> {
        if self.config.repl_mode() {
            run_repl(self.engine).map_err(|err| DriverError::Write {
                path: "<terminal>".to_string(),
                err,
            })?;

            return Ok(Outcome::Repl);
        }

        let source = match self.config.get_script()? {
            Some(source) => source,
            None => return Ok(Outcome::Repl),
        };

        let program = self.compile(&source, out)?;

        if self.config.dry_run {
            return Ok(Outcome::Compiled(program));
        }

        let trace = self.engine.run(&program);

        for line in trace.output.iter() {
            writeln!(out, "{}", line).map_err(stdout_error)?;
        }

        if !trace.status.is_halted() {
            writeln!(out, "{}", trace.status).map_err(stdout_error)?;
        }

        let Some(expectation) = self.config.expectation() else {
            return Ok(Outcome::Ran(trace));
        };

        let result = validate(&trace, &expectation);

        let verdict = match result.failure_reason.as_ref() {
            None => writeln!(out, "PASSED"),
            Some(reason) => writeln!(out, "FAILED: {}", reason),
        };

        verdict.map_err(stdout_error)?;

        Ok(Outcome::Checked(result))
    }

    // INPUT: SOURCE
    // STEP 1: SOURCE -> TOKENS
    // STEP 2: TOKENS -> PROGRAM
    // OUTPUT: PROGRAM
    fn compile(&self, source: &str, out: &mut impl Write) -> Result<Program, DriverError> {
        let tokens = tokenize(source).map_err(|errs| {
            syntax_error(
                source,
                SyntaxError::new(errs.into_iter().map(|e| e.map(Into::into)).collect()),
            )
        })?;

        if let Some(path) = self.config.tokens_output_path.clone() {
            output_string(tokens_to_string(&tokens), path, out)?;
        }

        let program =
            parse(&tokens).map_err(|errs| syntax_error(source, SyntaxError::new(errs)))?;

        debug!(
            source = self.config.get_source_path().as_deref().unwrap_or("<inline>"),
            instructions = program.len(),
            "compiled"
        );

        if let Some(path) = self.config.program_output_path.clone() {
            output_string(program.to_string(), path, out)?;
        }

        Ok(program)
    }
}

fn syntax_error(source: &str, error: SyntaxError) -> DriverError {
    DriverError::Syntax {
        text: source.to_string(),
        error,
    }
}

fn stdout_error(err: std::io::Error) -> DriverError {
    DriverError::Write {
        path: "<stdout>".to_string(),
        err,
    }
}

fn tokens_to_string(tokens: &[Spanned<Token>]) -> String {
    let mut output = String::new();

    for token in tokens.iter() {
        output.push_str(&format!(
            "{}:{}\t{}\n",
            token.span.line, token.span.column, token.item
        ));
    }

    output
}

fn output_string(
    output: String,
    path: Option<String>,
    out: &mut impl Write,
) -> Result<(), DriverError> {
    // add the path to the start of the output
    if let Some(path) = path.as_ref() {
        let write_err = |err| DriverError::Write {
            path: path.clone(),
            err,
        };
        let mut file = File::options()
            .append(true)
            .create(true)
            .open(path)
            .map_err(write_err)?;

        file.write_all(format!("========= FILE {path} ========\n").as_bytes())
            .map_err(write_err)?;

        file.write_all(output.as_bytes()).map_err(write_err)?;
    } else {
        writeln!(out, "{}", output).map_err(stdout_error)?;
    }

    Ok(())
}
