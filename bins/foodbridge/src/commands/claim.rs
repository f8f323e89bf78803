//! Claim command

use crate::output::{spinner, Status};
use crate::OutputFormat;
use anyhow::Result;
use foodbridge_core::model::ListingId;
use foodbridge_core::registry::ListingRegistry;
use foodbridge_search::FoodFinder;
use owo_colors::OwoColorize;

/// Claim a listing and print its pickup code
pub async fn run<R: ListingRegistry>(
    finder: &FoodFinder<R>,
    id: &str,
    name: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let id = ListingId::parse(id)?;

    let pb = (format == OutputFormat::Text).then(|| spinner("Claiming listing..."));
    let outcome = finder.claim(id, name).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let receipt = outcome?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&receipt)?),
        OutputFormat::Text => {
            Status::success("Claimed! Show this pickup code at the store:");
            println!();
            println!("    {}", receipt.pickup_code.bold().green());
            println!();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use foodbridge_core::memory::InMemoryRegistry;
    use foodbridge_core::model::{NewListing, NewStore};
    use foodbridge_core::{Error, FailureKind};
    use foodbridge_search::FinderSettings;

    fn finder_with_listing() -> (FoodFinder<InMemoryRegistry>, ListingId) {
        let registry = InMemoryRegistry::new();
        let store = registry
            .register_store(NewStore {
                name: "Corner Grocer".to_string(),
                latitude: 40.7128,
                longitude: -74.0060,
            })
            .unwrap();
        let listing = registry
            .add_listing(
                store.id,
                NewListing {
                    name: "Bananas".to_string(),
                    description: None,
                    expiration_date: Utc::now() + Duration::hours(6),
                },
            )
            .unwrap();
        (FoodFinder::new(registry, FinderSettings::default()), listing.id)
    }

    fn kind(err: &anyhow::Error) -> FailureKind {
        err.downcast_ref::<Error>().unwrap().kind()
    }

    #[tokio::test]
    async fn test_claim_then_conflict() {
        let (finder, id) = finder_with_listing();

        run(&finder, &id.to_string(), Some("Sam"), OutputFormat::Json)
            .await
            .unwrap();
        assert!(finder.registry().listing(id).unwrap().claimed);

        let err = run(&finder, &id.to_string(), Some("Alex"), OutputFormat::Json)
            .await
            .unwrap_err();
        assert_eq!(kind(&err), FailureKind::Conflict);
    }

    #[tokio::test]
    async fn test_bad_id_is_validation() {
        let (finder, _) = finder_with_listing();
        let err = run(&finder, "not-an-id", None, OutputFormat::Text)
            .await
            .unwrap_err();
        assert_eq!(kind(&err), FailureKind::Validation);

        let err = run(&finder, "   ", None, OutputFormat::Text).await.unwrap_err();
        assert_eq!(kind(&err), FailureKind::Validation);
    }
}
