//! UMA address helpers.

use crate::UmaError;

/// Top-level domains reserved for local use.
const LOCAL_TLDS: &[&str] = &[".local", ".internal", ".localhost", ".test"];

/// Splits `user@domain` into its two parts.
///
/// # Errors
///
/// Returns [`UmaError::InvalidReceiverAddress`] unless the address contains
/// exactly one `@`, both parts are non-empty and the domain is a bare
/// `host[:port]`.
pub fn split_address(address: &str) -> Result<(&str, &str), UmaError> {
    match address.split_once('@') {
        Some((user, domain)) if !user.is_empty() && is_bare_authority(domain) => {
            Ok((user, domain))
        }
        _ => Err(UmaError::InvalidReceiverAddress(address.to_owned())),
    }
}

/// Rejects anything that would end the authority part of a URL.
fn is_bare_authority(domain: &str) -> bool {
    !domain.is_empty()
        && !domain.chars().any(|c| {
            matches!(c, '@' | '/' | '?' | '#' | '\\') || c.is_whitespace() || c.is_control()
        })
}

/// Returns the VASP domain of an UMA address such as `$alice@vasp1.com`.
///
/// # Errors
///
/// Returns [`UmaError::InvalidReceiverAddress`] if the address is not of the form `user@domain`.
pub fn vasp_domain_from_uma_address(address: &str) -> Result<&str, UmaError> {
    split_address(address).map(|(_, domain)| domain)
}

/// Returns `true` if `domain` names the local machine or a local-use TLD.
///
/// A trailing `:port` is ignored. Local domains are reached over plain `http`.
#[must_use]
pub fn is_domain_localhost(domain: &str) -> bool {
    let host = strip_port(domain).to_ascii_lowercase();
    matches!(host.as_str(), "localhost" | "127.0.0.1" | "::1")
        || LOCAL_TLDS.iter().any(|tld| host.ends_with(tld))
}

fn strip_port(domain: &str) -> &str {
    if let Some(bracketed) = domain.strip_prefix('[') {
        return bracketed.split_once(']').map_or(bracketed, |(host, _)| host);
    }
    match domain.split_once(':') {
        // More than one colon is a bare IPv6 literal.
        Some((host, port)) if !port.contains(':') => host,
        _ => domain,
    }
}
