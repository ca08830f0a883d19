use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use elbsign_core::{Context, ProvideCredential, ProvideCredentialChain, Result};
use std::sync::Arc;

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Access key pair set on [`Config`]
/// 2. Environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new(config: Arc<Config>) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(ConfigCredentialProvider::new(config))
            .push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY};
    use crate::StaticCredentialProvider;
    use elbsign_core::StaticEnv;
    use std::collections::HashMap;

    fn env_ctx() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from_iter([
                (AWS_ACCESS_KEY_ID.to_string(), "env_access_key".to_string()),
                (AWS_SECRET_ACCESS_KEY.to_string(), "env_secret_key".to_string()),
            ]),
        })
    }

    #[tokio::test]
    async fn test_default_loader_without_anything() {
        crate::test_log::init();

        let l = DefaultCredentialProvider::new(Arc::new(Config::default()));
        let x = l
            .provide_credential(&Context::new())
            .await
            .expect("load must succeed");
        assert!(x.is_none());
    }

    #[tokio::test]
    async fn test_default_loader_prefers_config() {
        crate::test_log::init();

        let l = DefaultCredentialProvider::new(Arc::new(Config {
            access_key_id: Some("cfg_access_key".to_string()),
            secret_access_key: Some("cfg_secret_key".to_string()),
            ..Default::default()
        }));
        let x = l
            .provide_credential(&env_ctx())
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("cfg_access_key", x.access_key_id);
        assert_eq!("cfg_secret_key", x.secret_access_key);
    }

    #[tokio::test]
    async fn test_default_loader_falls_back_to_env() {
        crate::test_log::init();

        let l = DefaultCredentialProvider::new(Arc::new(Config::default()));
        let x = l
            .provide_credential(&env_ctx())
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("env_access_key", x.access_key_id);
        assert_eq!("env_secret_key", x.secret_access_key);
    }

    #[tokio::test]
    async fn test_default_loader_with_chain() {
        let l = DefaultCredentialProvider::with_chain(
            ProvideCredentialChain::new().push(StaticCredentialProvider::new("ak", "sk")),
        );
        let x = l
            .provide_credential(&Context::new())
            .await
            .expect("load must succeed")
            .expect("credential must be loaded");
        assert_eq!("ak", x.access_key_id);
    }

    #[test]
    fn test_debug_does_not_print_secret() {
        let provider = DefaultCredentialProvider::new(Arc::new(Config {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            secret_access_key: Some("TOPSECRETVALUE1234567890".to_string()),
            ..Default::default()
        }));
        let output = format!("{provider:?}");

        assert!(output.contains("ConfigCredentialProvider"));
        assert!(!output.contains("TOPSECRETVALUE1234567890"));
    }
}
