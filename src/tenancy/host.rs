//! Host string normalization and domain syntax rules.

use crate::config::TenancyConfig;

use super::error::TenancyError;

pub const MAX_DOMAIN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Reduce a `Host`-style value to a bare lowercase domain.
///
/// Strips scheme, userinfo, path/query/fragment, port and trailing dots.
/// Idempotent: `normalize_host(&normalize_host(x)) == normalize_host(x)`.
pub fn normalize_host(raw: &str) -> String {
    // Repeat until stable so inputs like "a.:80." settle in one call
    let mut current = normalize_once(raw);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();

    let without_scheme = match lowered.find("://") {
        Some(idx) => &lowered[idx + 3..],
        None => lowered.as_str(),
    };

    let authority = without_scheme
        .split(|c| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or("");

    let host_port = authority.rsplit('@').next().unwrap_or("");
    let host = strip_port(host_port.trim_end_matches('.'));

    host.trim_end_matches('.').to_string()
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // Bracketed IPv6 literal, keep the brackets
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Check letters/digits/hyphens/dots syntax on an already normalized domain.
pub fn validate_domain_format(domain: &str) -> Result<(), TenancyError> {
    let invalid = |reason: &str| Err(TenancyError::invalid_domain(domain, reason));

    if domain.is_empty() {
        return invalid("domain must not be empty");
    }
    if domain.len() > MAX_DOMAIN_LENGTH {
        return invalid("domain must be at most 253 characters");
    }
    if !domain.contains('.') {
        return invalid("domain must contain at least one dot");
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return invalid("domain contains an empty label");
        }
        if label.len() > MAX_LABEL_LENGTH {
            return invalid("each label must be at most 63 characters");
        }
        if !label.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            return invalid("only letters, digits, hyphens and dots are allowed");
        }
        if label.starts_with('-') || label.ends_with('-') {
            return invalid("labels must not start or end with a hyphen");
        }
    }

    // Also rules out IPv4 literals
    if domain.rsplit('.').next().is_some_and(|tld| tld.chars().all(|c| c.is_ascii_digit())) {
        return invalid("top-level label must not be numeric");
    }

    Ok(())
}

/// The platform's own domains: the root, anything beneath it, the portal,
/// local aliases and the configured extras (plus their subdomains).
pub fn is_reserved_domain(domain: &str, config: &TenancyConfig) -> bool {
    let within = |parent: &str| domain == parent || domain.ends_with(&format!(".{}", parent));

    within(&config.root_domain)
        || domain == config.portal_domain
        || config.local_hosts.iter().any(|h| h == domain)
        || config.reserved_domains.iter().any(|r| within(r))
}

/// `acme` for `acme.<root>`; `None` for the root itself or deeper names.
pub fn subdomain_label<'a>(host: &'a str, root_domain: &str) -> Option<&'a str> {
    let label = host.strip_suffix(root_domain)?.strip_suffix('.')?;
    if label.is_empty() || label.contains('.') {
        return None;
    }
    Some(label)
}

/// True when the host addresses the bare platform root.
pub fn is_root_host(host: &str, config: &TenancyConfig) -> bool {
    host == config.root_domain || config.local_hosts.iter().any(|h| h == host)
}
