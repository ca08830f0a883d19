use crate::constants::*;
use crate::Credential;
use async_trait::async_trait;
use elbsign_core::hash::base64_hmac_sha1;
use elbsign_core::time::{format_iso8601_millis, now, DateTime};
use elbsign_core::{Context, Error, Result, SignRequest, SigningRequest};
use http::request::Parts;
use log::debug;
use percent_encoding::utf8_percent_encode;
use std::fmt::Write;

/// RequestSigner that implements AWS Signature Version 2 for Query APIs.
///
/// - [Signature Version 2 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
///
/// The timestamp is captured once when the signer is created and reused for
/// every request it signs.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    api_version: String,
    timestamp: String,
    debug: bool,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a new signer for the ELB API version, timestamped now.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            timestamp: format_iso8601_millis(now()),
            debug: false,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// The signer takes the current time on creation. Only use this function
    /// for testing or reproducing a signature.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.timestamp = format_iso8601_millis(time);
        self
    }

    /// Write the canonical query and string to sign to the `debug` log.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The `Timestamp` value sent with every request.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid(
                "no credential loaded, ELB requests must be signed",
            ));
        };
        let mut signed_req = SigningRequest::build(req)?;

        canonicalize_query(&mut signed_req, cred, &self.api_version, &self.timestamp)?;
        let canonical_query = canonical_query_string(&signed_req);
        if self.debug {
            debug!(
                "query to sign:\n{}",
                canonical_query.split('&').collect::<Vec<_>>().join("\n")
            );
        }

        let string_to_sign = string_to_sign(&signed_req, &canonical_query)?;
        if self.debug {
            debug!("calculated string to sign: {string_to_sign}");
        }

        let signature = base64_hmac_sha1(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        );
        signed_req.query_push(SIGNATURE_PARAM, percent_encode(&signature));

        // Apply to the request.
        signed_req.apply(req)
    }
}

/// Percent-encode per RFC 3986, leaving only unreserved characters as is.
pub fn percent_encode(input: &str) -> String {
    utf8_percent_encode(input, &AWS_QUERY_ENCODE_SET).to_string()
}

/// Merge the authentication fields into the query, then encode every pair.
///
/// Pairs are sorted after encoding, by the bytes of the encoded key. This is
/// the same order as sorting raw keys only while keys consist of unreserved
/// characters, which holds for every ELB parameter name.
fn canonicalize_query(
    ctx: &mut SigningRequest,
    cred: &Credential,
    api_version: &str,
    timestamp: &str,
) -> Result<()> {
    let owned = [
        AWS_ACCESS_KEY_ID_PARAM,
        SIGNATURE_METHOD_PARAM,
        SIGNATURE_VERSION_PARAM,
        VERSION_PARAM,
        TIMESTAMP_PARAM,
        SIGNATURE_PARAM,
    ];
    if let Some(key) = owned.into_iter().find(|k| ctx.query_contains(k)) {
        return Err(
            Error::request_invalid("query already contains an authentication field")
                .with_context(format!("key: {key}")),
        );
    }
    if !ctx.query_contains(ACTION_PARAM) {
        return Err(Error::request_invalid("query must contain Action"));
    }

    ctx.query_push(AWS_ACCESS_KEY_ID_PARAM, cred.access_key_id.as_str());
    ctx.query_push(SIGNATURE_METHOD_PARAM, SIGNATURE_METHOD);
    ctx.query_push(SIGNATURE_VERSION_PARAM, SIGNATURE_VERSION);
    ctx.query_push(VERSION_PARAM, api_version);
    ctx.query_push(TIMESTAMP_PARAM, timestamp);

    ctx.query = ctx
        .query
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    ctx.query.sort();

    Ok(())
}

/// Join the encoded, byte ordered pairs as `k=v&k=v`.
fn canonical_query_string(ctx: &SigningRequest) -> String {
    SigningRequest::query_to_string(ctx.query.clone(), "=", "&")
}

/// Construct string to sign.
///
/// # Format
///
/// ```text
///   "GET" + "\n"
/// + lowercase(Host) + "\n"
/// + "/" + "\n"
/// + CanonicalizedQueryString
/// ```
fn string_to_sign(ctx: &SigningRequest, canonical_query: &str) -> Result<String> {
    let mut s = String::with_capacity(64 + canonical_query.len());
    writeln!(s, "{}", ctx.method)?;
    writeln!(s, "{}", ctx.host_lowercase())?;
    writeln!(s, "{}", ctx.path)?;
    write!(s, "{canonical_query}")?;

    Ok(s)
}
