//! Presigned URL rewriting
//!
//! The store signs URLs against the address the gateway uses to reach it,
//! which is usually a private network name such as `http://minio:9000`.
//! Clients need the public address instead.
//!
//! The query string is always dropped. It carries the SigV4 signature and
//! expiry, so returned URLs only resolve when the bucket allows public reads.

/// Swaps the internal endpoint prefix of a URL for the public one
#[derive(Clone, Debug)]
pub struct EndpointRewriter {
    internal_base: String,
    public_base: String,
}

impl EndpointRewriter {
    /// Create a rewriter. Trailing slashes on either base are ignored.
    pub fn new(internal_base: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            internal_base: trim_base(internal_base.into()),
            public_base: trim_base(public_base.into()),
        }
    }

    /// Internal endpoint prefix being matched
    pub fn internal_base(&self) -> &str {
        &self.internal_base
    }

    /// Public endpoint prefix substituted in
    pub fn public_base(&self) -> &str {
        &self.public_base
    }

    /// Replace the internal prefix with the public one and drop the query.
    ///
    /// URLs that do not start with the internal prefix keep their host.
    pub fn rewrite(&self, url: &str) -> String {
        let rewritten = match url.strip_prefix(self.internal_base.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with(['/', '?']) => {
                format!("{}{}", self.public_base, rest)
            }
            _ => {
                tracing::debug!(url = %strip_query(url), "URL does not match internal endpoint, keeping host");
                url.to_string()
            }
        };
        strip_query(&rewritten).to_string()
    }
}

/// Truncate a URL at its first `?`
pub fn strip_query(url: &str) -> &str {
    match url.find('?') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

fn trim_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}
