//! Parameter definitions module.
//!
//! Provides the declarative side of a parameter form:
//! - The closed set of parameter kinds and their value types
//! - Resolution of initial values against caller-stored values
//! - Parsing of definition documents emitted by CAD customizers

pub mod types;
pub mod resolve;


pub use types::{
    format_number, parse_number, ButtonSpec, ParamKind, ParamValue, ParameterDefinition,
    StoredParams, UnknownKind, ValueMapping,
};
pub use resolve::{resolve_definitions, resolve_value};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Malformed definition document: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionDocument {
    List(Vec<ParameterDefinition>),
    Customizer { parameters: Vec<ParameterDefinition> },
}

/// Parses either a bare JSON array of definitions or a customizer document
/// of the form `{"parameters": [...]}`.
pub fn parse_definitions(json: &str) -> Result<Vec<ParameterDefinition>, DefinitionError> {
    let doc: DefinitionDocument = serde_json::from_str(json)?;
    Ok(match doc {
        DefinitionDocument::List(defs) => defs,
        DefinitionDocument::Customizer { parameters } => parameters,
    })
}
