use std::io;

use thiserror::Error;

use crate::parser::SyntaxError;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("unable to read {path}: {err}")]
    Read {
        path: String,
        #[source]
        err: io::Error,
    },

    #[error("unable to write {path}: {err}")]
    Write {
        path: String,
        #[source]
        err: io::Error,
    },

    #[error("{error}")]
    Syntax { text: String, error: SyntaxError },
}

impl DriverError {
    pub fn render(&self) -> String {
        match self {
            DriverError::Syntax { text, error } => error.render_colored(text),
            err => format!("{}\n", err),
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            DriverError::Syntax { .. } => 2,
            DriverError::Read { .. } | DriverError::Write { .. } => 3,
        }
    }
}
