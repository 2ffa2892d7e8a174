use crate::cluster::{SecretSource, TlsSecret, TLS_CERT_KEY, TLS_SECRET_TYPE};
use crate::utils::errors::{Result, WatcherError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::path::Path;

/// Objects requested per list call
const PAGE_SIZE: u32 = 500;

/// `SecretSource` backed by the Kubernetes API server
pub struct KubeSecretSource {
    client: Client,
}

impl KubeSecretSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using an explicit kubeconfig, or the in-cluster / default config
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        let config = match kubeconfig {
            Some(path) => {
                tracing::debug!("Loading kubeconfig from {}", path.display());
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    WatcherError::Config(format!(
                        "Failed to read kubeconfig {}: {e}",
                        path.display()
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| WatcherError::Config(format!("Invalid kubeconfig: {e}")))?
            }
            None => Config::infer().await.map_err(|e| {
                WatcherError::Config(format!("Unable to infer cluster configuration: {e}"))
            })?,
        };

        tracing::debug!("Using cluster endpoint {}", config.cluster_url);
        let client = Client::try_from(config)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl SecretSource for KubeSecretSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let namespaces = list_all(&api, ListParams::default()).await?;

        Ok(namespaces
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    async fn list_tls_secrets(&self, namespace: &str) -> Result<Vec<TlsSecret>> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("type={TLS_SECRET_TYPE}"));
        let secrets = list_all(&api, params).await?;

        Ok(secrets
            .into_iter()
            .filter_map(|secret| to_tls_secret(namespace, secret))
            .collect())
    }
}

/// List every object, following continue tokens
async fn list_all<K>(api: &Api<K>, params: ListParams) -> Result<Vec<K>>
where
    K: Clone + DeserializeOwned + Debug,
{
    let mut params = params.limit(PAGE_SIZE);
    let mut items = Vec::new();

    loop {
        let page = api.list(&params).await?;
        items.extend(page.items);

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => {
                tracing::trace!("Fetching next page of {} objects", PAGE_SIZE);
                params = params.continue_token(&token);
            }
            _ => return Ok(items),
        }
    }
}

/// Keep only TLS-typed secrets; the server-side field selector is not trusted blindly
fn to_tls_secret(namespace: &str, secret: Secret) -> Option<TlsSecret> {
    if secret.type_.as_deref() != Some(TLS_SECRET_TYPE) {
        return None;
    }

    let name = secret.metadata.name?;
    let certificate = secret
        .data
        .and_then(|mut data| data.remove(TLS_CERT_KEY))
        .map(|bytes| bytes.0);

    Some(TlsSecret {
        namespace: namespace.to_string(),
        name,
        certificate,
    })
}
