use std::fmt;

#[derive(Debug)]
pub enum SvgError {
    Xml(roxmltree::Error),
    NotSvg(String),
    UnknownGradient(String),
    UnknownFill(String),
    UnknownColor(String),
    UnknownXlink(String),
    UnknownLayer(String),
    Io(std::io::Error),
}

impl SvgError {
    // True for errors caused by the document content rather than the caller.
    pub fn is_malformed_document(&self) -> bool {
        !matches!(self, SvgError::UnknownLayer(_) | SvgError::Io(_))
    }
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgError::Xml(err) => write!(f, "xml error: {}", err),
            SvgError::NotSvg(root) => write!(f, "not an svg document (root element: {})", root),
            SvgError::UnknownGradient(id) => write!(f, "unknown gradient url: #{}", id),
            SvgError::UnknownFill(value) => write!(f, "unknown fill string: {}", value),
            SvgError::UnknownColor(value) => write!(f, "unknown color string: {}", value),
            SvgError::UnknownXlink(link) => write!(f, "unknown gradient xlink: {}", link),
            SvgError::UnknownLayer(name) => write!(f, "could not find svg group: {}", name),
            SvgError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for SvgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvgError::Xml(err) => Some(err),
            SvgError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<roxmltree::Error> for SvgError {
    fn from(value: roxmltree::Error) -> Self {
        SvgError::Xml(value)
    }
}

impl From<std::io::Error> for SvgError {
    fn from(value: std::io::Error) -> Self {
        SvgError::Io(value)
    }
}
