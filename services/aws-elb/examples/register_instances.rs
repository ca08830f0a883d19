//! Register instances with a load balancer.
//!
//! ```shell
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... ELB_DEBUG=true \
//!     cargo run --example register_instances -- my-load-balancer i-111 i-222
//! ```

use anyhow::{bail, Result};
use elbsign_aws_elb::{Client, Config, ElbError};
use elbsign_core::{Context, OsEnv};
use elbsign_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(load_balancer) = args.next() else {
        bail!("usage: register_instances <load-balancer> <instance-id>...");
    };
    let instances = args.collect::<Vec<_>>();

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::default());
    let client = Client::new(ctx, Config::default())?;

    match client
        .register_instances_with_load_balancer(instances, &load_balancer)
        .await
    {
        Ok(output) => {
            println!("request id: {}", output.request_id);
            for id in output.instances {
                println!("registered: {id}");
            }
        }
        Err(ElbError::Api(resp)) => {
            println!("request id: {}", resp.request_id);
            for err in &resp.errors {
                println!("{}: {}", err.code, err.message);
            }
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
