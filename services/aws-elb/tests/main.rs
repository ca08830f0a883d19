use std::env;

use anyhow::Result;
use elbsign_aws_elb::{
    Client, Config, Credential, ElbError, RequestSigner, StaticCredentialProvider,
};
use elbsign_core::time::parse_iso8601_millis;
use elbsign_core::{Context, OsEnv, ProvideCredential, Signer, StaticEnv};
use elbsign_http_send_reqwest::ReqwestHttpSend;
use log::warn;
use pretty_assertions::assert_eq;

fn init_client() -> Option<Client> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("ELBSIGN_AWS_ELB_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::default());
    let config = Config {
        access_key_id: Some(
            env::var("ELBSIGN_AWS_ELB_ACCESS_KEY").expect("env ELBSIGN_AWS_ELB_ACCESS_KEY must set"),
        ),
        secret_access_key: Some(
            env::var("ELBSIGN_AWS_ELB_SECRET_KEY").expect("env ELBSIGN_AWS_ELB_SECRET_KEY must set"),
        ),
        endpoint: env::var("ELBSIGN_AWS_ELB_ENDPOINT").ok(),
        debug: true,
        ..Default::default()
    };

    Some(Client::new(ctx, config).expect("client must be valid"))
}

#[tokio::test]
async fn test_register_instances_with_load_balancer() -> Result<()> {
    let Some(client) = init_client() else {
        warn!("ELBSIGN_AWS_ELB_TEST is not set, skipped");
        return Ok(());
    };

    let name = env::var("ELBSIGN_AWS_ELB_LOAD_BALANCER")
        .expect("env ELBSIGN_AWS_ELB_LOAD_BALANCER must set");
    let instance = env::var("ELBSIGN_AWS_ELB_INSTANCE_ID")
        .expect("env ELBSIGN_AWS_ELB_INSTANCE_ID must set");

    let output = client
        .register_instances_with_load_balancer(instance.as_str(), &name)
        .await?;
    assert!(output.instances.contains(&instance));

    Ok(())
}

#[tokio::test]
async fn test_register_instances_with_missing_load_balancer() -> Result<()> {
    let Some(client) = init_client() else {
        warn!("ELBSIGN_AWS_ELB_TEST is not set, skipped");
        return Ok(());
    };

    let err = client
        .register_instances_with_load_balancer("i-00000000", "elbsign-not-exist")
        .await
        .expect_err("load balancer must not exist");
    assert!(matches!(err, ElbError::Api(_)), "expected service errors, got {err:?}");
    let resp = err.api_errors().expect("must be reported as service errors");
    assert!(!resp.is_transport_failure());
    assert!(!resp.errors.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
    let config = Config {
        access_key_id: Some("AKIDEXAMPLE".to_string()),
        secret_access_key: Some("secret".to_string()),
        endpoint: Some("127.0.0.1:1".to_string()),
        ..Default::default()
    };
    let client = Client::new(ctx, config)?;

    let err = client
        .register_instances_with_load_balancer("i-111", "lb1")
        .await
        .expect_err("nothing listens on port 1");
    let resp = err.api_errors().expect("must be reported as service errors");
    assert!(resp.is_transport_failure());
    assert_eq!(resp.request_id, "N/A");

    Ok(())
}

#[tokio::test]
async fn test_sign_with_static_credential() -> Result<()> {
    let ctx = Context::new().with_env(StaticEnv::default());
    let loader = StaticCredentialProvider::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY");
    assert!(loader.provide_credential(&ctx).await?.is_some());

    let builder =
        RequestSigner::new().with_time(parse_iso8601_millis("2024-01-02T03:04:05.000Z")?);
    let signer: Signer<Credential> = Signer::new(ctx, loader, builder);

    let mut parts = http::Request::get(
        "http://elasticloadbalancing.amazonaws.com/?Action=DescribeLoadBalancers",
    )
    .body(())?
    .into_parts()
    .0;
    signer.sign(&mut parts).await?;

    let query = parts.uri.query().expect("query must exist");
    assert!(query.starts_with("AWSAccessKeyId=AKIDEXAMPLE&Action=DescribeLoadBalancers&Signature="));
    assert!(query.ends_with(
        "&SignatureMethod=HmacSHA1&SignatureVersion=2&Timestamp=2024-01-02T03%3A04%3A05.000Z&Version=2009-05-15"
    ));

    Ok(())
}
