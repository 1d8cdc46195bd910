//! Declarative endpoint-table configuration.
//!
//! The table maps endpoint names onto URL path templates and carries the
//! schema, host, base path, the set of endpoints that never take a trailing
//! id segment, and the whitelist of payload attributes forwarded as query
//! parameters. A complete default table is built in; deployments can
//! override any part of it from TOML. The table is loaded once and only
//! mutated through the explicit setters, which re-derive the base URL on
//! the next request.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::Deserialize;

use crate::error::ApiError;

/// Default port of a local development API server.
pub const LOCALHOST_PORT: u16 = 9002;

/// URL schema for API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    Http,
    Https,
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Known API hosts. Each one implies an authority, and the local host also
/// implies the `http` schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Host {
    /// `apps.ticketmatic.com`
    Production,
    /// `test.ticketmatic.com`
    Test,
    /// `qa.ticketmatic.com`
    Qa,
    /// A local development server, `localhost:{port}`.
    Localhost { port: u16 },
}

impl Host {
    /// Host (and port where applicable) as it appears in URLs.
    pub fn authority(&self) -> String {
        match self {
            Self::Production => "apps.ticketmatic.com".to_string(),
            Self::Test => "test.ticketmatic.com".to_string(),
            Self::Qa => "qa.ticketmatic.com".to_string(),
            Self::Localhost { port } => format!("localhost:{port}"),
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority())
    }
}

impl FromStr for Host {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apps.ticketmatic.com" => Ok(Self::Production),
            "test.ticketmatic.com" => Ok(Self::Test),
            "qa.ticketmatic.com" => Ok(Self::Qa),
            "localhost" => Ok(Self::Localhost {
                port: LOCALHOST_PORT,
            }),
            other => Err(format!("unrecognized host: {other}")),
        }
    }
}

impl TryFrom<String> for Host {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Endpoint table plus request-shaping settings for one API deployment.
///
/// Path templates carry positional `%s` slots: the account shortname fills
/// the first, record id parts fill the rest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub schema: Schema,
    pub host: Host,
    /// Base path prepended to every endpoint path, e.g. `/api/1`.
    pub path: String,
    /// Endpoint name to path template.
    pub endpoints: BTreeMap<String, String>,
    /// Endpoints exempt from the appended `/{id}` segment on get/put/delete.
    pub no_extra_param: BTreeSet<String>,
    /// Payload attributes allowed through to the query string.
    pub params_optional: BTreeSet<String>,
    /// When set, failed requests log their full request/response context.
    pub debug: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let endpoints = [
            ("contacts", "/%s/contacts"),
            ("events", "/%s/events"),
            ("eventtickets", "/%s/events/%s/tickets"),
            ("orders", "/%s/orders"),
            ("tickets", "/%s/tickets"),
            ("queries", "/%s/tools/queries"),
            ("export", "/%s/tools/queries/export"),
            ("saveimage", "/%s/events/%s/images"),
            ("addresstypes", "/%s/settings/system/addresstypes"),
            ("contacttitles", "/%s/settings/system/contacttitles"),
            ("customfields", "/%s/settings/system/customfields"),
            ("phonenumbertypes", "/%s/settings/system/phonenumbertypes"),
            ("relationtypes", "/%s/settings/system/relationtypes"),
            ("deliveryscenarios", "/%s/settings/ticketsales/deliveryscenarios"),
            ("paymentmethods", "/%s/settings/ticketsales/paymentmethods"),
            ("salechannels", "/%s/settings/ticketsales/saleschannels"),
            ("ordermailtemplates", "/%s/settings/communicationanddesign/ordermails"),
            ("ticketlayouts", "/%s/settings/communicationanddesign/ticketlayouts"),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect();

        let no_extra_param = ["queries", "export"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let params_optional = [
            "offset",
            "limit",
            "filter",
            "orderby",
            "output",
            "searchterm",
            "simplefilter",
            "lastupdatesince",
            "includearchived",
            "fields",
            "context",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            schema: Schema::Https,
            host: Host::Production,
            path: "/api/1".to_string(),
            endpoints,
            no_extra_param,
            params_optional,
            debug: false,
        }
    }
}

impl ApiConfig {
    /// Parse a (possibly partial) configuration from TOML. Missing fields
    /// fall back to the built-in defaults.
    pub fn from_toml_str(input: &str) -> Result<Self, ApiError> {
        toml::from_str(input).map_err(|err| ApiError::Config(format!("invalid endpoint table: {err}")))
    }

    /// `schema://host/basePath`, derived on every call so setters take
    /// effect immediately.
    pub fn base_url(&self) -> String {
        format!("{}://{}{}", self.schema, self.host, self.path)
    }

    /// Switch hosts. Unrecognized hosts are rejected with a diagnostic and
    /// leave the configuration unchanged. Selecting the local host also
    /// forces the `http` schema.
    pub fn set_host(&mut self, host: &str) {
        match host.parse::<Host>() {
            Ok(host) => {
                if matches!(host, Host::Localhost { .. }) {
                    self.schema = Schema::Http;
                }
                self.host = host;
            }
            Err(err) => warn!("could not set host: {err}"),
        }
    }

    /// Switch schemas. Anything other than `http`/`https` is rejected with
    /// a diagnostic.
    pub fn set_schema(&mut self, schema: &str) {
        match schema {
            "http" => self.schema = Schema::Http,
            "https" => self.schema = Schema::Https,
            other => warn!("could not set schema: {other}"),
        }
    }

    /// Toggle failure diagnostics.
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }
}
