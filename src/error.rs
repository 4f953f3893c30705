use crate::config::ConfigError;
use thiserror::Error;

/// Errors that abort a run with a non-zero exit status
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed XMLTV document: {source}")]
    Xml {
        #[source]
        source: quick_xml::Error,
    },

    #[error("Expected a <tv> root element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("XMLTV document ended before its root element was closed")]
    UnclosedDocument,

    #[error("Unexpected <{0}> element after the closing </tv>")]
    TrailingElement(String),

    #[error("No channel ids found in {path}")]
    EmptyChannelSource { path: String },

    #[error("Date range starting at {0} is out of range")]
    DateOutOfRange(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {source}")]
    Output {
        #[source]
        source: std::io::Error,
    },
}

impl From<quick_xml::Error> for FilterError {
    fn from(source: quick_xml::Error) -> Self {
        FilterError::Xml { source }
    }
}

/// Errors local to a single channel, programme or playlist entry.
///
/// The offending record is skipped and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("<{element}> is missing its '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> has an unreadable attribute: {reason}")]
    BadAttribute {
        element: &'static str,
        reason: String,
    },

    #[error("Could not parse timestamp '{0}'")]
    BadTimestamp(String),

    #[error("#EXTINF line {line} has no stream URL")]
    MissingUrl { line: usize },

    #[error("Not an #EXTINF header: '{0}'")]
    NotExtInf(String),
}
