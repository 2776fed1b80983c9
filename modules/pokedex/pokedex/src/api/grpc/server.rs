//! gRPC server implementation for the pokedex
//!
//! Delegates matching to the domain `Service` and maps the result onto the
//! wire reply. A miss is answered with the default (all-empty) reply, never
//! with an error status.

use std::sync::Arc;

use tonic::{Request, Response, Status};

use pokedex_sdk::{Lookup, LookupReply, LookupRequest};

use crate::domain::{CatalogRecord, Service};

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct LookupServiceImpl {
    service: Arc<Service>,
}

impl LookupServiceImpl {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }

    fn reply_for(&self, record: &CatalogRecord) -> LookupReply {
        LookupReply {
            id: record.id,
            localized_name: record.localized_name.clone(),
            category: record.category.clone(),
            image_url: self.service.image_url(record.id),
        }
    }

    /// Build the reply for a request without going through the transport.
    #[must_use]
    pub fn get_pokemon_reply(&self, request: &LookupRequest) -> LookupReply {
        self.service
            .lookup(&request.query_name)
            .map(|record| self.reply_for(record))
            .unwrap_or_default()
    }
}

#[tonic::async_trait]
impl Lookup for LookupServiceImpl {
    async fn get_pokemon(
        &self,
        request: Request<LookupRequest>,
    ) -> Result<Response<LookupReply>, Status> {
        let req = request.into_inner();
        Ok(Response::new(self.get_pokemon_reply(&req)))
    }
}

#[cfg(test)]
#[allow(clippy::non_ascii_literal)]
mod tests {
    use super::*;
    use crate::domain::{Catalog, CatalogEntry};

    fn server() -> LookupServiceImpl {
        let catalog = Catalog::load([
            CatalogEntry::delimited("Jigglypuff", "Fée, Rondoudou, 039"),
            CatalogEntry::delimited("Pikachu", "Électrique, Pikachu, 025"),
        ])
        .unwrap();
        LookupServiceImpl::new(Arc::new(Service::new(
            Arc::new(catalog),
            "https://sprites.test/",
        )))
    }

    fn request(name: &str) -> Request<LookupRequest> {
        Request::new(LookupRequest {
            query_name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn test_match_builds_full_reply() {
        let reply = server()
            .get_pokemon(request("jigglypuff"))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(
            reply,
            LookupReply {
                id: 39,
                localized_name: "Rondoudou".to_owned(),
                category: "Fée".to_owned(),
                image_url: "https://sprites.test/39.png".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn test_miss_is_default_reply_not_error() {
        let reply = server()
            .get_pokemon(request("Missingno"))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(reply, LookupReply::default());
        assert_eq!(reply.id, 0);
        assert!(reply.localized_name.is_empty());
        assert!(reply.category.is_empty());
        assert!(reply.image_url.is_empty());
    }

    #[test]
    fn test_every_embedded_record_answers_in_any_case() {
        let catalog = Arc::new(Catalog::embedded().unwrap());
        let server = LookupServiceImpl::new(Arc::new(Service::new(
            Arc::clone(&catalog),
            "https://sprites.test/",
        )));

        for record in catalog.iter() {
            let expected = LookupReply {
                id: record.id,
                localized_name: record.localized_name.clone(),
                category: record.category.clone(),
                image_url: format!("https://sprites.test/{}.png", record.id),
            };
            for query in [
                record.english_name.clone(),
                record.english_name.to_lowercase(),
                record.english_name.to_uppercase(),
            ] {
                let reply = server.get_pokemon_reply(&LookupRequest {
                    query_name: query.clone(),
                });
                assert_eq!(reply, expected, "query {query:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_repeated_lookups_are_identical() {
        let server = server();
        let first = server.get_pokemon_reply(&LookupRequest {
            query_name: "PIKACHU".to_owned(),
        });
        for _ in 0..10 {
            let again = server
                .get_pokemon(request("PIKACHU"))
                .await
                .unwrap()
                .into_inner();
            assert_eq!(again, first);
        }
    }
}
