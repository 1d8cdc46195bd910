//! Endpoint resolution.
//!
//! Maps (operation kind, endpoint name, optional id) onto a fully qualified
//! URL using the configured endpoint table. Get/put/delete operations gain
//! a trailing id slot unless the endpoint is exempt; composite ids fill two
//! successive slots, supporting templates keyed by e.g. an entity type plus
//! an entity id.

use reqwest::Method;

use crate::auth::Credentials;
use crate::config::ApiConfig;
use crate::error::ApiError;

/// Logical operation families the resolver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    List,
    Get,
    Post,
    Put,
    Delete,
}

impl OperationKind {
    /// HTTP method carrying this operation.
    pub fn http_method(&self) -> Method {
        match self {
            Self::List | Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Delete => Method::DELETE,
        }
    }

    /// Whether the resolved URL gains a trailing `/{id}` segment.
    pub(crate) fn appends_id(&self) -> bool {
        matches!(self, Self::Get | Self::Put | Self::Delete)
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

/// Identifier substituted into an endpoint path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    Single(String),
    /// Two-part key substituted at two template positions.
    Composite(String, String),
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<u32> for RecordId {
    fn from(id: u32) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::Single(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self::Single(id)
    }
}

impl<A: ToString, B: ToString> From<(A, B)> for RecordId {
    fn from((first, second): (A, B)) -> Self {
        Self::Composite(first.to_string(), second.to_string())
    }
}

/// Resolve an operation against the endpoint table into a complete URL.
///
/// Positional `%s` slots are filled left to right: shortname first (the `_`
/// sentinel when the credentials carry none), then the id part(s). A slot
/// left unfilled means the id shape does not match the template, which is
/// reported the same way as a missing endpoint.
pub(crate) fn resolve_url(
    config: &ApiConfig,
    credentials: &Credentials,
    kind: OperationKind,
    endpoint: &str,
    id: Option<&RecordId>,
) -> Result<String, ApiError> {
    let unknown = || ApiError::UnknownEndpoint {
        operation: kind.as_str(),
        endpoint: endpoint.to_string(),
    };

    let path_template = config.endpoints.get(endpoint).ok_or_else(unknown)?;

    let mut template = format!("{}{}", config.base_url(), path_template);
    if kind.appends_id() && !config.no_extra_param.contains(endpoint) {
        template.push_str("/%s");
    }

    let mut args = vec![credentials.shortname_or_default()];
    match id {
        Some(RecordId::Single(value)) => args.push(value),
        Some(RecordId::Composite(first, second)) => {
            args.push(first);
            args.push(second);
        }
        None => {}
    }

    substitute(&template, &args).ok_or_else(unknown)
}

/// Replace successive `%s` slots with `args`, left to right. `None` when
/// the template has more slots than arguments.
fn substitute(template: &str, args: &[&str]) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut args = args.iter();

    while let Some(pos) = rest.find("%s") {
        out.push_str(&rest[..pos]);
        out.push_str(args.next()?);
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);

    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig::default()
    }

    fn credentials() -> Credentials {
        Credentials::new("demo", "key", "secret")
    }

    #[test]
    fn get_appends_id_segment() {
        let id = RecordId::from(42i64);
        let url = resolve_url(&config(), &credentials(), OperationKind::Get, "contacts", Some(&id))
            .unwrap();
        assert_eq!(url, "https://apps.ticketmatic.com/api/1/demo/contacts/42");
    }

    #[test]
    fn exempt_endpoint_keeps_url_without_id() {
        let mut config = config();
        config.no_extra_param.insert("contacts".to_string());

        let url = resolve_url(&config, &credentials(), OperationKind::Get, "contacts", None).unwrap();
        assert_eq!(url, "https://apps.ticketmatic.com/api/1/demo/contacts");
    }

    #[test]
    fn list_never_appends_id() {
        let url = resolve_url(&config(), &credentials(), OperationKind::List, "orders", None).unwrap();
        assert_eq!(url, "https://apps.ticketmatic.com/api/1/demo/orders");
    }

    #[test]
    fn composite_id_fills_two_slots() {
        let id = RecordId::from((55i64, 777i64));
        let url = resolve_url(
            &config(),
            &credentials(),
            OperationKind::Get,
            "eventtickets",
            Some(&id),
        )
        .unwrap();
        assert_eq!(url, "https://apps.ticketmatic.com/api/1/demo/events/55/tickets/777");
    }

    #[test]
    fn missing_shortname_substitutes_sentinel() {
        let credentials = Credentials::without_shortname("key", "secret");
        let url = resolve_url(&config(), &credentials, OperationKind::List, "events", None).unwrap();
        assert_eq!(url, "https://apps.ticketmatic.com/api/1/_/events");
    }

    #[test]
    fn unknown_endpoint_is_rejected() {
        let err =
            resolve_url(&config(), &credentials(), OperationKind::Get, "bogus", None).unwrap_err();
        assert!(matches!(err, ApiError::UnknownEndpoint { operation: "get", .. }));
    }

    #[test]
    fn unfilled_slot_is_rejected() {
        // Get on a composite-keyed endpoint with a single id leaves the
        // trailing slot unfilled.
        let id = RecordId::from(55i64);
        let err = resolve_url(
            &config(),
            &credentials(),
            OperationKind::Get,
            "eventtickets",
            Some(&id),
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::UnknownEndpoint { .. }));
    }

    #[test]
    fn substitute_fills_left_to_right() {
        assert_eq!(substitute("/a/%s/b/%s", &["x", "y"]), Some("/a/x/b/y".to_string()));
        assert_eq!(substitute("/plain", &["x"]), Some("/plain".to_string()));
        assert_eq!(substitute("/a/%s/%s", &["x"]), None);
    }
}
