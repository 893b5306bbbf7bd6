//! JSON envelopes on stdout and mapping of failures to messages and exit codes.

use std::{io::Write as _, process::ExitCode};

use marquee_dal::{Error, ErrorKind};
use marquee_types::ValidationErrors;
use serde_json::{json, Value};
use tracing::error;

pub fn print_json(value: &Value) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

pub fn error_kind(err: &anyhow::Error) -> ErrorKind {
    if let Some(e) = err.downcast_ref::<Error>() {
        e.kind()
    } else if err.downcast_ref::<ValidationErrors>().is_some() {
        ErrorKind::ValidationFailure
    } else {
        ErrorKind::StorageFailure
    }
}

fn validation_errors(err: &anyhow::Error) -> Option<&ValidationErrors> {
    match err.downcast_ref::<Error>() {
        Some(Error::ValidationFailure(errors)) => Some(errors),
        _ => err.downcast_ref::<ValidationErrors>(),
    }
}

pub fn error_body(err: &anyhow::Error) -> Value {
    match error_kind(err) {
        ErrorKind::RecordNotFound => json!({"error": "the requested resource could not be found"}),
        ErrorKind::EditConflict => json!({
            "error": "unable to update the record due to an edit conflict, please try again"
        }),
        ErrorKind::ValidationFailure => json!({"error": validation_errors(err)}),
        ErrorKind::StorageFailure => json!({
            "error": "the server encountered a problem and could not process your request"
        }),
    }
}

pub fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::StorageFailure => 1,
        ErrorKind::RecordNotFound => 3,
        ErrorKind::EditConflict => 4,
        ErrorKind::ValidationFailure => 5,
    }
}

pub fn report_error(err: &anyhow::Error) -> ExitCode {
    let kind = error_kind(err);
    if kind == ErrorKind::StorageFailure {
        error!("{err:#}");
    }
    match serde_json::to_string_pretty(&error_body(err)) {
        Ok(body) => eprintln!("{body}"),
        Err(e) => error!("Cannot encode error response: {e}"),
    }
    ExitCode::from(exit_code(kind))
}
