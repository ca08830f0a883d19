//! Signed requests for the AWS Elastic Load Balancing Query API.
//!
//! Requests are signed with [Signature Version 2](https://docs.aws.amazon.com/general/latest/gr/signature-version-2.html)
//! and responses are parsed into a generic [`XmlDocument`].
//!
//! ```no_run
//! use elbsign_aws_elb::{Client, Config};
//! use elbsign_core::{Context, OsEnv};
//! use elbsign_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> Result<(), elbsign_aws_elb::ElbError> {
//! let ctx = Context::new()
//!     .with_env(OsEnv)
//!     .with_http_send(ReqwestHttpSend::default());
//! let client = Client::new(ctx, Config::default())?;
//!
//! match client.register_instances_with_load_balancer("i-111", "lb1").await {
//!     Ok(output) => println!("instances: {:?}", output.instances),
//!     Err(err) => eprintln!("register failed: {err}"),
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub use client::Client;
pub use client::RegisterInstancesOutput;

mod config;
pub use config::Config;

mod constants;
pub use constants::{
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, ELB_DEBUG,
    ELB_ENDPOINT,
};

mod credential;
pub use credential::Credential;

mod error;
pub use error::{ApiError, ApiErrorResponse, ElbError};

mod params;
pub use params::{InstanceIds, Params};

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::percent_encode;
pub use sign_request::RequestSigner;

mod xml;
pub use xml::{XmlDocument, XmlNode, XmlValue};

#[cfg(test)]
mod test_log;
