//! Nearby search command

use crate::output::{format_count, format_distance, spinner, Status};
use crate::OutputFormat;
use anyhow::Result;
use chrono::Local;
use foodbridge_core::registry::ListingRegistry;
use foodbridge_geo::Coordinate;
use foodbridge_search::{FoodFinder, SearchOutcome, SearchRadius, SearchResults};
use owo_colors::OwoColorize;
use std::fmt::Write as _;

/// Search around `origin` and print the grouped results
pub async fn run<R: ListingRegistry>(
    finder: &FoodFinder<R>,
    origin: Coordinate,
    radius: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let radius = radius.map(SearchRadius::from_input);
    let shown_radius = radius.unwrap_or(finder.settings().default_radius);

    let pb = (format == OutputFormat::Text).then(|| spinner("Searching nearby listings..."));
    let outcome = finder.search(origin, radius).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let results = match outcome? {
        SearchOutcome::Completed(results) => results,
        SearchOutcome::Superseded => {
            Status::warning("Search was superseded by a newer one");
            return Ok(());
        }
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            if results.is_empty() {
                Status::info(&format!(
                    "No food available within {shown_radius} {}",
                    results.unit()
                ));
            } else {
                print!("{}", render_text(&results));
            }
        }
    }
    Ok(())
}

/// Text rendering of grouped results, one block per store
pub fn render_text(results: &SearchResults) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!(
            "Found {} at {}",
            format_count(results.len(), "listing", "listings"),
            format_count(results.groups().len(), "store", "stores")
        )
        .bold()
    );

    for group in results.groups() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}  {}",
            group.store.name.bold(),
            format_distance(Some(group.distance), results.unit()).dimmed()
        );
        for result in &group.listings {
            let listing = &result.listing;
            let expires = listing
                .expiration_date
                .with_timezone(&Local)
                .format("%b %-d, %H:%M");
            let _ = writeln!(out, "  • {}  expires {}", listing.name, expires);
            if let Some(ref description) = listing.description {
                let _ = writeln!(out, "    {}", description.dimmed());
            }
            let _ = writeln!(out, "    {}", format!("id {}", listing.id).dimmed());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use foodbridge_core::memory::InMemoryRegistry;
    use foodbridge_core::model::{NewListing, NewStore};
    use foodbridge_search::FinderSettings;

    const SF: Coordinate = Coordinate { latitude: 37.7749, longitude: -122.4194 };

    fn finder() -> FoodFinder<InMemoryRegistry> {
        let registry = InMemoryRegistry::new();
        let store = registry
            .register_store(NewStore {
                name: "Market St Pantry".to_string(),
                latitude: 37.7833,
                longitude: -122.4167,
            })
            .unwrap();
        registry
            .add_listing(
                store.id,
                NewListing {
                    name: "Muffins".to_string(),
                    description: Some("A dozen blueberry".to_string()),
                    expiration_date: Utc::now() + Duration::hours(24),
                },
            )
            .unwrap();
        FoodFinder::new(registry, FinderSettings::default())
    }

    #[tokio::test]
    async fn test_render_grouped_results() {
        let finder = finder();
        let results = finder.search(SF, None).await.unwrap().completed().unwrap();

        let text = render_text(&results);
        assert!(text.contains("Market St Pantry"));
        assert!(text.contains("Muffins"));
        assert!(text.contains("A dozen blueberry"));
        assert!(text.contains("mi away") || text.contains("ft away"));
    }

    #[tokio::test]
    async fn test_run_json() {
        let finder = finder();
        run(&finder, SF, Some("5"), OutputFormat::Json).await.unwrap();
        assert_eq!(finder.cached_results().len(), 1);
    }

    #[tokio::test]
    async fn test_run_invalid_origin() {
        let finder = finder();
        let err = run(&finder, Coordinate::new(95.0, 0.0), None, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<foodbridge_core::Error>().is_some());
    }
}
