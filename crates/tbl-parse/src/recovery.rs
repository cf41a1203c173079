//! Per-file recovery boundary.
//!
//! Grammar code propagates [`ParseError`] with `?`. The functions here are the
//! single place an abort is caught: the failure is logged with its code, the
//! diagnostic totals are printed, and the error is handed back so the caller
//! can skip this file and continue with the next one.

use crate::config::ParseConfig;
use crate::error::Result;
use crate::parser::Parser;
use crate::source::SourceText;
use crate::vfs::{FileSystem, PathType};

/// Runs `grammar` over `source`, catching any abort at the file boundary.
///
/// The parse slot is released before returning, so the next file can be
/// parsed straight away whatever the outcome.
pub fn parse_guarded<T, F>(source: SourceText, config: ParseConfig, grammar: F) -> Result<T>
where
    F: FnOnce(&mut Parser) -> Result<T>,
{
    let file = source.filename().to_string();
    let mut parser = Parser::new(source, config).inspect_err(|err| {
        tracing::error!(file = %file, code = err.code().value(), "Unable to start parse: {err}");
    })?;

    let outcome = grammar(&mut parser);
    parser.display_parse_diagnostics();

    match outcome {
        Ok(value) => {
            tracing::debug!(file = %file, "Parsed table file");
            Ok(value)
        }
        Err(err) => {
            tracing::error!(
                file = %file,
                code = err.code().value(),
                "Unable to parse {file}! Error code = {}. {err}",
                err.code().value()
            );
            Err(err)
        }
    }
}

/// Loads `name` through `fs` and runs `grammar` over it under
/// [`parse_guarded`].
pub fn parse_file<T, F>(
    fs: &dyn FileSystem,
    name: &str,
    path_type: PathType,
    config: ParseConfig,
    grammar: F,
) -> Result<T>
where
    F: FnOnce(&mut Parser) -> Result<T>,
{
    let source = SourceText::load(fs, name, path_type, &config).inspect_err(|err| {
        tracing::error!(file = name, code = err.code().value(), "Unable to load {name}: {err}");
    })?;
    parse_guarded(source, config, grammar)
}
