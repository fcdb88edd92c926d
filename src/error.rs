use std::io;
use std::path::PathBuf;

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum TrailError {
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    NoRootElement,

    #[error("Document ended before all elements were closed")]
    UnclosedElement,

    #[error("Unexpected content after the root element: {0}")]
    TrailingContent(String),

    #[error("Undefined entity '&{name};'")]
    UnknownEntity { name: String },

    #[error("Root element uses undeclared namespace prefix '{prefix}'")]
    UnboundPrefix { prefix: String },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <trkpt>")]
    InvalidAttribute {
        attribute: &'static str,
        value: String,
    },

    #[error("Invalid elevation '{value}' on <trkpt>")]
    InvalidElevation { value: String },

    #[error("Delimiter '{0}' is not a single ASCII character")]
    InvalidDelimiter(char),

    #[error("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<quick_xml::events::attributes::AttrError> for TrailError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(e.into())
    }
}

impl From<TrailError> for JsValue {
    fn from(e: TrailError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
