//! Resource Fetcher
//!
//! Executes a resource request and turns the reply into JSON the facade can
//! wrap. Replies are normalized: `{"data": X, ...}` becomes `X`, anything
//! without a `data` member is kept whole.

use crate::error::{Error, Result, UnexpectedResponse};
use crate::json::JsonView;
use crate::weibo::http::{sanitize_for_log, RawResponse, Request, Transport};
use serde_json::Value;

/// Strip the `data` envelope if present
pub fn normalize(decoded: Value) -> Value {
    match decoded {
        Value::Object(mut map) if map.contains_key("data") => map.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}

/// Check status, parse the body and normalize it
pub fn decode(url: &str, response: &RawResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(UnexpectedResponse::new(url, response.status, response.body.as_str(), "a successful response").into());
    }

    let decoded: Value = serde_json::from_str(&response.body).map_err(|err| {
        tracing::warn!(
            "invalid JSON from {}: {} - {}",
            url,
            err,
            sanitize_for_log(&response.body)
        );
        UnexpectedResponse::new(url, response.status, response.body.as_str(), "a JSON body")
    })?;

    if !decoded.is_object() {
        return Err(UnexpectedResponse::new(url, response.status, response.body.as_str(), "a JSON object").into());
    }

    Ok(normalize(decoded))
}

async fn execute(transport: &dyn Transport, request: &Request) -> Result<(String, RawResponse)> {
    let url = request.full_url();
    let response = transport
        .execute(request)
        .await
        .map_err(Error::Transport)?;
    Ok((url, response))
}

/// Fetch a single object's normalized payload
pub async fn fetch_object(transport: &dyn Transport, request: &Request) -> Result<JsonView> {
    let (url, response) = execute(transport, request).await?;
    match decode(&url, &response)? {
        Value::Object(map) => Ok(JsonView::from_map(map)),
        _ => Err(UnexpectedResponse::new(url, response.status, response.body, "a JSON object under `data`").into()),
    }
}

/// Fetch a listing page's normalized payload (object or array)
pub async fn fetch_envelope(transport: &dyn Transport, request: &Request) -> Result<Value> {
    let (url, response) = execute(transport, request).await?;
    let payload = decode(&url, &response)?;
    if payload.is_object() || payload.is_array() {
        Ok(payload)
    } else {
        Err(UnexpectedResponse::new(url, response.status, response.body, "a JSON object or array under `data`").into())
    }
}

/// Collect the listing items of a page.
///
/// Each card in `cards` contributes its `item_key` member; grouped cards
/// contribute the members of every entry in `card_group`. A bare array
/// payload is taken as the item list itself. With `original_only`, reposts
/// (items carrying `retweeted_status`) are dropped.
pub fn extract_items(payload: &Value, item_key: &str, original_only: bool) -> Vec<Value> {
    let items: Vec<&Value> = match payload {
        Value::Array(items) => items.iter().collect(),
        _ => payload
            .get("cards")
            .and_then(Value::as_array)
            .map(|cards| {
                cards
                    .iter()
                    .flat_map(|card| match card.get("card_group").and_then(Value::as_array) {
                        Some(group) => group.iter().collect::<Vec<_>>(),
                        None => vec![card],
                    })
                    .filter_map(|card| card.get(item_key))
                    .collect()
            })
            .unwrap_or_default(),
    };

    items
        .into_iter()
        .filter(|item| !(original_only && item.get("retweeted_status").is_some()))
        .cloned()
        .collect()
}
