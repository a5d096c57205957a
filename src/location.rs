//! Named request data locations.

use std::fmt::{self, Display};

/// A named source of request data.
///
/// Six locations are recognized and materialized by the HTTP integration.
/// Any other name is carried as [`Location::Other`] so callers can validate
/// data they extract themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// The URL query string.
    Query,
    /// A JSON request body.
    Json,
    /// A form-urlencoded request body.
    Form,
    /// Request headers.
    Header,
    /// Matched path parameters.
    Param,
    /// Cookies sent with the request.
    Cookie,
    /// Any other caller-defined location.
    Other(String),
}

impl Location {
    /// Returns the location's name as used in issue paths.
    pub fn as_str(&self) -> &str {
        match self {
            Location::Query => "query",
            Location::Json => "json",
            Location::Form => "form",
            Location::Header => "header",
            Location::Param => "param",
            Location::Cookie => "cookie",
            Location::Other(name) => name,
        }
    }

    /// Returns true for the header location, whose field names match
    /// case-insensitively.
    pub fn is_header(&self) -> bool {
        matches!(self, Location::Header)
    }

    /// Returns true for locations read from the request body.
    pub fn is_body(&self) -> bool {
        matches!(self, Location::Json | Location::Form)
    }
}

impl From<&str> for Location {
    fn from(name: &str) -> Self {
        match name {
            "query" => Location::Query,
            "json" => Location::Json,
            "form" => Location::Form,
            "header" => Location::Header,
            "param" => Location::Param,
            "cookie" => Location::Cookie,
            other => Location::Other(other.to_string()),
        }
    }
}

impl From<String> for Location {
    fn from(name: String) -> Self {
        Location::from(name.as_str())
    }
}

impl From<&Location> for Location {
    fn from(location: &Location) -> Self {
        location.clone()
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
