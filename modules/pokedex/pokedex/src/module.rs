//! Pokedex module definition
//!
//! Owns the startup sequence of the server: load the catalog, build the
//! domain service, expose it as gRPC routes and host them until shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;

use pokedex_sdk::{FILE_DESCRIPTOR_SET, LookupServer, SERVICE_NAME};
use pokedex_transport_grpc::server::{bind_tcp, serve_tcp};

use crate::api::grpc::LookupServiceImpl;
use crate::config::PokedexConfig;
use crate::domain::{Catalog, Service};

/// Pokedex module.
///
/// Holds the ready-to-serve domain service. Building one validates the whole
/// catalog, so a module that exists can always answer lookups.
#[derive(Debug, Clone)]
pub struct PokedexModule {
    config: PokedexConfig,
    service: Arc<Service>,
}

impl PokedexModule {
    /// Load the catalog named by `config` (or the built-in one) and build the
    /// lookup service over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or is malformed.
    pub fn init(config: PokedexConfig) -> Result<Self> {
        tracing::info!("Initializing pokedex module");

        let (catalog, source) = match &config.catalog_path {
            Some(path) => (
                Catalog::from_file(path)
                    .with_context(|| format!("failed to load catalog '{}'", path.display()))?,
                "file",
            ),
            None => (
                Catalog::embedded().context("built-in catalog is malformed")?,
                "embedded",
            ),
        };
        tracing::info!(records = catalog.len(), source, "catalog loaded");

        let service = Arc::new(Service::new(
            Arc::new(catalog),
            config.image_base_url.clone(),
        ));

        tracing::info!("pokedex module initialized");
        Ok(Self { config, service })
    }

    #[must_use]
    pub fn config(&self) -> &PokedexConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// gRPC routes exposing the lookup service and server reflection.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded descriptor set cannot be decoded.
    pub fn routes(&self) -> Result<Routes> {
        tracing::debug!(service_name = SERVICE_NAME, "registering gRPC service");
        let lookup = LookupServer::new(LookupServiceImpl::new(Arc::clone(&self.service)));

        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("failed to build reflection service")?;

        Ok(Routes::new(lookup).add_service(reflection))
    }

    /// Bind the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or already in use.
    pub async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        bind_tcp(&self.config.listen_addr).await
    }

    /// Serve lookups on `listener` until `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn serve(&self, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
        serve_tcp(listener, self.routes()?, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_init_with_embedded_catalog() {
        let module = PokedexModule::init(PokedexConfig::default()).unwrap();
        assert_eq!(module.service().catalog().len(), 151);
        assert_eq!(module.service().lookup("jigglypuff").unwrap().id, 39);
    }

    #[test]
    fn test_init_with_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"- {{ name: "Onix", value: "Roche, Onix, 095" }}"#).unwrap();

        let config = PokedexConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..PokedexConfig::default()
        };
        let module = PokedexModule::init(config).unwrap();
        assert_eq!(module.service().catalog().len(), 1);
        assert!(module.service().lookup("pikachu").is_none());
    }

    #[test]
    fn test_init_fails_on_malformed_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"- {{ name: "Onix", value: "Roche, Onix" }}"#).unwrap();

        let config = PokedexConfig {
            catalog_path: Some(file.path().to_path_buf()),
            ..PokedexConfig::default()
        };
        let err = PokedexModule::init(config).unwrap_err();
        assert!(format!("{err:#}").contains("expected 3"), "{err:#}");
    }

    #[test]
    fn test_init_fails_on_missing_catalog() {
        let config = PokedexConfig {
            catalog_path: Some("/definitely/not/here.yaml".into()),
            ..PokedexConfig::default()
        };
        assert!(PokedexModule::init(config).is_err());
    }

    #[test]
    fn test_routes_build_with_reflection() {
        let module = PokedexModule::init(PokedexConfig::default()).unwrap();
        assert!(module.routes().is_ok());
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_listen_addr() {
        let config = PokedexConfig {
            listen_addr: "nowhere".to_owned(),
            ..PokedexConfig::default()
        };
        let module = PokedexModule::init(config).unwrap();
        assert!(module.bind().await.is_err());
    }
}
