use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use elbsign_core::{Context, Error, Result, Signer};
use http::StatusCode;
use log::{debug, warn};

use crate::constants::ACTION_PARAM;
use crate::error::transport_failure_document;
use crate::sign_request::percent_encode;
use crate::xml::{XmlDocument, XmlValue};
use crate::{
    ApiErrorResponse, Config, Credential, DefaultCredentialProvider, ElbError, InstanceIds,
    Params, RequestSigner,
};

const REGISTER_INSTANCES_ACTION: &str = "RegisterInstancesWithLoadBalancer";

/// Client for the Elastic Load Balancing Query API.
///
/// Every call is signed with Signature Version 2 and sent as a `GET` to
/// `http://<endpoint>/`.
#[derive(Clone, Debug)]
pub struct Client {
    signer: Signer<Credential>,
    endpoint: String,
    debug: bool,
    timeout: Duration,
}

impl Client {
    /// Create a client, loading unset config fields from the env of `ctx`.
    ///
    /// Both access key id and secret access key must be available.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let config = config.from_env(&ctx);

        if config.access_key_id.as_deref().unwrap_or_default().is_empty() {
            return Err(Error::config_invalid("access key id is required"));
        }
        if config
            .secret_access_key
            .as_deref()
            .unwrap_or_default()
            .is_empty()
        {
            return Err(Error::config_invalid("secret access key is required"));
        }

        let builder = RequestSigner::new().with_debug(config.debug);
        let loader = DefaultCredentialProvider::new(Arc::new(config.clone()));
        Self::with_signer(Signer::new(ctx, loader, builder), &config)
    }

    /// Create a client on top of a prepared signer.
    ///
    /// Credentials come from the signer's provider and only `endpoint`,
    /// `debug` and `timeout` are taken from `config`.
    pub fn with_signer(signer: Signer<Credential>, config: &Config) -> Result<Self> {
        let endpoint = config.endpoint();
        if endpoint.is_empty() || endpoint.contains('/') {
            return Err(Error::config_invalid("endpoint must be a bare host")
                .with_context(format!("endpoint: {endpoint}")));
        }

        Ok(Self {
            signer,
            endpoint: endpoint.to_string(),
            debug: config.debug,
            timeout: config.timeout,
        })
    }

    /// The host requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sign and send one call, returning the parsed response.
    ///
    /// A failed round trip, a timeout or a `5xx` status does not return an
    /// error. They are reported as a document with request id `N/A` and one
    /// `HTTP POST FAILURE` error, like any other service error.
    pub async fn execute(&self, action: &str, params: Params) -> Result<XmlDocument> {
        if action.is_empty() {
            return Err(Error::request_invalid("action is required"));
        }
        params.check_reserved()?;

        let (mut parts, body) = self.build_request(action, &params)?.into_parts();
        self.signer.sign(&mut parts).await?;
        if self.debug {
            debug!("request url: {}", parts.uri);
        }
        let req = http::Request::from_parts(parts, body);

        let sent = tokio::time::timeout(self.timeout, self.signer.context().http_send_as_string(req));
        let body = match sent.await {
            Ok(Ok(resp)) if resp.status().as_u16() >= 500 => {
                warn!("{action} failed with status {}", resp.status());
                transport_failure_document(&status_reason(resp.status()))
            }
            Ok(Ok(resp)) => resp.into_body(),
            Ok(Err(err)) => {
                warn!("{action} failed to send: {err}");
                transport_failure_document(&err.to_string())
            }
            Err(_) => {
                warn!("{action} timed out after {:?}", self.timeout);
                transport_failure_document(&format!("request timed out after {:?}", self.timeout))
            }
        };
        if self.debug {
            debug!("response body: {body}");
        }

        let doc = XmlDocument::parse(&body).map_err(|e| e.with_context(format!("action: {action}")))?;
        if self.debug {
            debug!("parsed response: {doc:#?}");
        }
        Ok(doc)
    }

    /// Register EC2 instances with a load balancer.
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), elbsign_aws_elb::ElbError> {
    /// use elbsign_aws_elb::{Client, Config};
    /// use elbsign_core::{Context, OsEnv};
    /// use elbsign_http_send_reqwest::ReqwestHttpSend;
    ///
    /// let ctx = Context::new()
    ///     .with_env(OsEnv)
    ///     .with_http_send(ReqwestHttpSend::default());
    /// let client = Client::new(ctx, Config::default())?;
    /// let output = client
    ///     .register_instances_with_load_balancer(["i-111", "i-222"], "lb1")
    ///     .await?;
    /// println!("registered: {:?}", output.instances);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register_instances_with_load_balancer(
        &self,
        instance_ids: impl Into<InstanceIds>,
        load_balancer_name: &str,
    ) -> std::result::Result<RegisterInstancesOutput, ElbError> {
        let params = register_instances_params(&instance_ids.into(), load_balancer_name)?;

        let doc = self.execute(REGISTER_INSTANCES_ACTION, params).await?;
        if doc.has_errors() {
            return Err(ApiErrorResponse::from_document(&doc).into());
        }
        Ok(RegisterInstancesOutput::from_document(&doc))
    }

    fn build_request(&self, action: &str, params: &Params) -> Result<http::Request<Bytes>> {
        let mut query = format!("{ACTION_PARAM}={}", percent_encode(action));
        for (k, v) in params {
            query.push('&');
            query.push_str(&percent_encode(k));
            query.push('=');
            query.push_str(&percent_encode(v));
        }

        let req = http::Request::get(format!("http://{}/?{query}", self.endpoint))
            .body(Bytes::new())?;
        Ok(req)
    }
}

fn register_instances_params(
    instance_ids: &InstanceIds,
    load_balancer_name: &str,
) -> Result<Params> {
    if load_balancer_name.is_empty() {
        return Err(Error::request_invalid("load balancer name is required"));
    }
    instance_ids.validate()?;

    let mut params = Params::new();
    params.insert("LoadBalancerName", load_balancer_name);
    params.insert_members("Instances", "InstanceId", instance_ids);
    Ok(params)
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

/// Result of [`Client::register_instances_with_load_balancer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterInstancesOutput {
    /// Request id returned by the service.
    pub request_id: String,
    /// Instances registered with the load balancer after the call.
    pub instances: Vec<String>,
}

impl RegisterInstancesOutput {
    /// Extract the output from a success document.
    pub fn from_document(doc: &XmlDocument) -> Self {
        let instances = doc
            .body
            .path(&[
                "RegisterInstancesWithLoadBalancerResult",
                "Instances",
                "member",
            ])
            .into_iter()
            .flat_map(XmlValue::iter)
            .filter_map(XmlValue::as_node)
            .filter_map(|v| v.text("InstanceId"))
            .map(str::to_string)
            .collect();

        Self {
            request_id: doc.request_id().unwrap_or_default().to_string(),
            instances,
        }
    }
}
