//! URL, query string, form and JSON encodings of UMA messages.
//!
//! Query parameters and form fields are emitted in ascending key order, so
//! two implementations encoding the same message produce the same string.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::{Url, form_urlencoded};

use crate::UmaError;
use crate::address::{is_domain_localhost, split_address};
use crate::negotiation::VersionNegotiator;
use crate::proto::{
    LnurlpRequest, LnurlpResponse, PayReqResponse, PayRequest, PostTransactionCallback,
    PubKeyResponse, UnixTimestamp,
};

const LNURLP_PATH_PREFIX: [&str; 2] = [".well-known", "lnurlp"];

/// Renders a capability request as the URL the sending VASP fetches.
///
/// Local domains (see [`is_domain_localhost`]) use `http`, everything else
/// `https`. The compliance query parameters are added only to an UMA request;
/// a plain LNURL request has no query string.
///
/// The receiver must parse the URL back to the exact address that was
/// signed, so an address the URL would rewrite is rejected: an upper-case or
/// non-ASCII host, a default port, or a user part that needs percent-encoding.
///
/// # Errors
///
/// Returns [`UmaError::InvalidReceiverAddress`] if the receiver address is not
/// `user@domain` or would not survive the round trip through the URL.
pub fn encode_lnurlp_request_url(request: &LnurlpRequest) -> Result<Url, UmaError> {
    let invalid = || UmaError::InvalidReceiverAddress(request.receiver_address.clone());
    let (user, domain) = split_address(&request.receiver_address)?;
    let scheme = if is_domain_localhost(domain) {
        "http"
    } else {
        "https"
    };
    let mut url = Url::parse(&format!("{scheme}://{domain}/")).map_err(|_| invalid())?;
    if url_authority(&url).as_deref() != Some(domain) {
        return Err(invalid());
    }
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(LNURLP_PATH_PREFIX).push(user);
    }
    if url.path_segments().and_then(Iterator::last) != Some(user) {
        return Err(invalid());
    }
    if let Some(uma) = request.clone().upgrade() {
        url.query_pairs_mut()
            .append_pair(
                "isSubjectToTravelRule",
                if uma.is_subject_to_travel_rule {
                    "true"
                } else {
                    "false"
                },
            )
            .append_pair("nonce", &uma.nonce)
            .append_pair("signature", &uma.signature)
            .append_pair("timestamp", &uma.timestamp.to_string())
            .append_pair("umaVersion", &uma.uma_version)
            .append_pair("vaspDomain", &uma.vasp_domain);
    }
    Ok(url)
}

/// Parses the URL of an incoming capability request.
///
/// The URL must be `https` (or any scheme on a local domain) with path
/// `/.well-known/lnurlp/<user>`. The receiver address is `<user>@<host[:port]>`.
/// Empty query parameters count as absent, so a plain LNURL request parses to
/// a loose request with no compliance fields.
///
/// # Errors
///
/// - [`UmaError::InvalidRequestUrl`] if the scheme, host or path is wrong
/// - [`UmaError::InvalidQueryParameter`] if `timestamp` is not an integer
/// - [`UmaError::UnsupportedVersion`] if `umaVersion` names an unsupported major version
#[cfg_attr(
    feature = "telemetry",
    tracing::instrument(name = "uma.parse_lnurlp_request", skip_all, err)
)]
pub fn parse_lnurlp_request(
    negotiator: &VersionNegotiator,
    url: &Url,
) -> Result<LnurlpRequest, UmaError> {
    let domain =
        url_authority(url).ok_or_else(|| UmaError::InvalidRequestUrl("missing host".into()))?;
    if url.scheme() != "https" && !is_domain_localhost(&domain) {
        return Err(UmaError::InvalidRequestUrl(format!(
            "scheme {} is only allowed for local domains",
            url.scheme()
        )));
    }

    let segments: Vec<&str> = url.path_segments().map(Iterator::collect).unwrap_or_default();
    let user = match segments.as_slice() {
        [prefix @ .., user] if prefix == LNURLP_PATH_PREFIX && !user.is_empty() => *user,
        _ => {
            return Err(UmaError::InvalidRequestUrl(format!(
                "unexpected path {}",
                url.path()
            )));
        }
    };

    let query: BTreeMap<String, String> = url
        .query_pairs()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let timestamp = query
        .get("timestamp")
        .map(|value| {
            value
                .parse::<UnixTimestamp>()
                .map_err(|_| UmaError::InvalidQueryParameter {
                    name: "timestamp",
                    value: value.clone(),
                })
        })
        .transpose()?;

    let uma_version = query.get("umaVersion").cloned();
    if let Some(version) = uma_version
        .as_deref()
        .filter(|version| !negotiator.is_supported(version))
    {
        return Err(negotiator.unsupported_version_error(version).into());
    }

    let request = LnurlpRequest {
        receiver_address: format!("{user}@{domain}"),
        nonce: query.get("nonce").cloned(),
        signature: query.get("signature").cloned(),
        is_subject_to_travel_rule: query
            .get("isSubjectToTravelRule")
            .map(|value| value.eq_ignore_ascii_case("true")),
        vasp_domain: query.get("vaspDomain").cloned(),
        timestamp,
        uma_version,
    };
    #[cfg(feature = "telemetry")]
    if !request.is_uma_request() {
        tracing::debug!(receiver = %request.receiver_address, "uma.lnurlp_request.not_uma");
    }
    Ok(request)
}

/// `host[:port]` of a URL as it appears in a receiver address.
fn url_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

/// Returns `true` if `url` is a well-formed UMA capability request.
#[must_use]
pub fn is_uma_lnurlp_query(negotiator: &VersionNegotiator, url: &Url) -> bool {
    parse_lnurlp_request(negotiator, url).is_ok_and(|request| request.is_uma_request())
}

/// Projects a message onto form fields.
///
/// String members are passed through verbatim; every other member is written
/// as its JSON text. Members are returned in ascending key order.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the message does not serialize to a JSON object.
pub fn to_form_pairs<T: Serialize>(message: &T) -> Result<Vec<(String, String)>, UmaError> {
    let Value::Object(members) = serde_json::to_value(message)? else {
        return Err(<serde_json::Error as serde::ser::Error>::custom(
            "only JSON objects can be form encoded",
        )
        .into());
    };
    members
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => serde_json::to_string(&other)?,
            };
            Ok::<_, UmaError>((key, value))
        })
        .collect()
}

/// Encodes a message as an `application/x-www-form-urlencoded` body.
///
/// # Errors
///
/// See [`to_form_pairs`].
pub fn to_form_urlencoded<T: Serialize>(message: &T) -> Result<String, UmaError> {
    let pairs = to_form_pairs(message)?;
    Ok(form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish())
}

/// The invoice request members carried as JSON text in form fields.
const JSON_FORM_FIELDS: &[&str] = &["payerData", "payeeData"];

/// Rebuilds an invoice request from its form fields.
///
/// `payerData` and `payeeData` are parsed as JSON text; every other field is
/// taken as a string. Later duplicates of a field replace earlier ones.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if a JSON field is malformed or a member has the
/// wrong shape, and [`UmaError::InvalidAmountField`] if `amount` is malformed.
pub fn pay_request_from_form<I, K, V>(pairs: I) -> Result<PayRequest, UmaError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut members = Map::new();
    for (key, value) in pairs {
        let (key, value) = (key.as_ref(), value.as_ref());
        let value = if JSON_FORM_FIELDS.contains(&key) {
            serde_json::from_str(value)?
        } else {
            Value::String(value.to_owned())
        };
        members.insert(key.to_owned(), value);
    }
    Ok(PayRequest::from_value(Value::Object(members))?)
}

/// Rebuilds an invoice request from a query string or form body.
///
/// # Errors
///
/// See [`pay_request_from_form`].
pub fn pay_request_from_query(query: &str) -> Result<PayRequest, UmaError> {
    pay_request_from_form(form_urlencoded::parse(query.as_bytes()))
}

/// Parses a capability response body.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the body is malformed.
pub fn parse_lnurlp_response(body: &[u8]) -> Result<LnurlpResponse, UmaError> {
    let response: LnurlpResponse = serde_json::from_slice(body)?;
    #[cfg(feature = "telemetry")]
    if !response.is_uma_response() {
        tracing::debug!(callback = %response.callback, "uma.lnurlp_response.not_uma");
    }
    Ok(response)
}

/// Parses an invoice request body.
///
/// # Errors
///
/// Returns [`UmaError::InvalidAmountField`] if `amount` is malformed and
/// [`UmaError::Json`] for any other malformed input.
pub fn parse_pay_request(body: &[u8]) -> Result<PayRequest, UmaError> {
    let request = PayRequest::from_json(body)?;
    #[cfg(feature = "telemetry")]
    if !request.is_uma_request() {
        tracing::debug!(amount = request.amount, "uma.pay_request.not_uma");
    }
    Ok(request)
}

/// Parses an invoice response body.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the body is malformed.
pub fn parse_pay_req_response(body: &[u8]) -> Result<PayReqResponse, UmaError> {
    let response: PayReqResponse = serde_json::from_slice(body)?;
    #[cfg(feature = "telemetry")]
    if !response.is_uma_response() {
        tracing::debug!("uma.pay_req_response.not_uma");
    }
    Ok(response)
}

/// Parses a public key response body.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the body is malformed.
pub fn parse_pub_key_response(body: &[u8]) -> Result<PubKeyResponse, UmaError> {
    Ok(serde_json::from_slice(body)?)
}

/// Parses a post-transaction callback body.
///
/// # Errors
///
/// Returns [`UmaError::Json`] if the body is malformed.
pub fn parse_post_transaction_callback(body: &[u8]) -> Result<PostTransactionCallback, UmaError> {
    Ok(serde_json::from_slice(body)?)
}
