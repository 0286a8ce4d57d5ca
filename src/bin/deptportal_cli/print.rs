#![deny(clippy::all, clippy::pedantic)]

use serde::Serialize;

use crate::context::CliError;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| CliError::Output(e.to_string()))?;
    println!("{out}");
    Ok(())
}
