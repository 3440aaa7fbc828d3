use std::fmt::{self, Display, Write};

use percent_encoding::{AsciiSet, CONTROLS, NON_ALPHANUMERIC, utf8_percent_encode};

use bytes::Bytes;
use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;

/// Common part of all services: the connection and the subdomain requests go to.
#[derive(Debug, Clone)]
pub struct Service {
    connection: Connection,
    subdomain: String,
}

impl Service {
    pub(crate) fn new(connection: Connection, subdomain: Option<&str>, default: &str) -> Self {
        Self {
            connection,
            subdomain: subdomain.unwrap_or(default).to_owned(),
        }
    }

    pub fn subdomain(&self) -> &str {
        &self.subdomain
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Full URL for given request.
    pub fn url(&self, request: &str) -> String {
        self.connection.url(request, Some(&self.subdomain))
    }

    pub(crate) async fn connect(&self, request: &str) -> Result<Bytes> {
        self.connection
            .call_service(request, Some(&self.subdomain))
            .await
    }

    pub(crate) async fn connect_json(&self, request: &str) -> Result<Value> {
        let body = self.connect(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Ordered `key=value` pairs, joined with `&`.
///
/// CloudMade expects coordinates, lists and marker specs unescaped (`center=51.4,0`), so
/// [`QueryString::push`] appends the value as is, and only free text goes through
/// [`QueryString::push_encoded`].
#[derive(Debug, Default)]
pub(crate) struct QueryString {
    pairs: Vec<(&'static str, String)>,
}

impl QueryString {
    pub fn push(&mut self, key: &'static str, value: impl Display) -> &mut Self {
        self.pairs.push((key, value.to_string()));
        self
    }

    pub fn push_encoded(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.pairs.push((key, encode(value)));
        self
    }

    pub fn push_opt(&mut self, key: &'static str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.push(key, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_char('&')?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// RFC 3986 unreserved characters stay, everything else is encoded.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Characters which would end a query parameter or a `|`-separated part of it. URL-like
/// punctuation, such as `:`, `/`, `?` and `=`, stays as is.
const PARAMETER_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'|');

/// Percent-encode free text, e.g. a geocoding query.
pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// Percent-encode a value embedded in a structured parameter, such as a marker's image URL.
pub(crate) fn encode_parameter(value: &str) -> String {
    utf8_percent_encode(value, PARAMETER_VALUE).to_string()
}
