//! Query-parameter filtering.

use log::warn;
use serde_json::{Map, Value};

use crate::config::ApiConfig;

/// Keep only payload attributes that appear in the configured whitelist.
///
/// Everything else is dropped with a diagnostic so arbitrary fields never
/// reach the remote API. A missing or non-object payload yields an empty
/// parameter map; filtering never fails a request.
pub(crate) fn filter_params(config: &ApiConfig, payload: Option<&Value>) -> Map<String, Value> {
    let mut params = Map::new();

    let Some(Value::Object(fields)) = payload else {
        return params;
    };

    for (key, value) in fields {
        if !config.params_optional.contains(key) {
            warn!("attribute skipped: {key}");
            continue;
        }
        params.insert(key.clone(), value.clone());
    }

    params
}
