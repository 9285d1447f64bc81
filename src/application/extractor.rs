//! Selector-based listing extraction
//!
//! Field selectors are resolved against the first content-area match when a
//! content area is configured, otherwise against the whole document. The
//! three collections are paired positionally and truncated to the shortest
//! one. A selector matching nothing is not an error: the page simply yields
//! no listings.

use tracing::{debug, warn};

use crate::infrastructure::config::{SelectorSet, Strictness};
use crate::infrastructure::error::ExtractionError;
use crate::infrastructure::session::RenderSession;

/// Raw values of one listing, before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    /// Trimmed element text
    pub description: String,
    /// Trimmed element text
    pub price: String,
    /// `href` attribute verbatim
    pub href: Option<String>,
}

/// Selector match counts for one page state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingCounts {
    pub descriptions: usize,
    pub prices: usize,
    pub links: usize,
}

impl ListingCounts {
    /// Number of complete listings the extractor would pair up
    pub fn complete(&self) -> usize {
        self.descriptions.min(self.prices).min(self.links)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SelectorExtractor<'a> {
    selectors: &'a SelectorSet,
    strictness: Strictness,
}

impl<'a> SelectorExtractor<'a> {
    pub const fn new(selectors: &'a SelectorSet, strictness: Strictness) -> Self {
        Self {
            selectors,
            strictness,
        }
    }

    /// Resolve the content-area scope. `Ok(None)` means the configured
    /// content area matched nothing; `Ok(Some(None))` means document scope.
    async fn scope<S: RenderSession>(
        &self,
        session: &mut S,
    ) -> Result<Option<Option<S::Element>>, ExtractionError> {
        match self.selectors.content_area() {
            Some(area) => Ok(session
                .find_all(area, None)
                .await?
                .into_iter()
                .next()
                .map(Some)),
            None => Ok(Some(None)),
        }
    }

    /// Match counts of the three field selectors within the current scope,
    /// without reading any element content.
    pub async fn count<S: RenderSession>(
        &self,
        session: &mut S,
    ) -> Result<ListingCounts, ExtractionError> {
        let Some(scope) = self.scope(session).await? else {
            return Ok(ListingCounts::default());
        };
        Ok(ListingCounts {
            descriptions: session
                .find_all(&self.selectors.description, scope.as_ref())
                .await?
                .len(),
            prices: session.find_all(&self.selectors.price, scope.as_ref()).await?.len(),
            links: session.find_all(&self.selectors.link, scope.as_ref()).await?.len(),
        })
    }

    pub async fn extract<S: RenderSession>(
        &self,
        session: &mut S,
    ) -> Result<Vec<RawListing>, ExtractionError> {
        let Some(scope) = self.scope(session).await? else {
            warn!(
                "Content area '{}' matched nothing, page yields no listings",
                self.selectors.content_area
            );
            return Ok(Vec::new());
        };

        let descriptions = session
            .find_all(&self.selectors.description, scope.as_ref())
            .await?;
        let prices = session.find_all(&self.selectors.price, scope.as_ref()).await?;
        let links = session.find_all(&self.selectors.link, scope.as_ref()).await?;

        debug!(
            "Matched {} descriptions, {} prices, {} links",
            descriptions.len(),
            prices.len(),
            links.len()
        );

        let strict = self.strictness == Strictness::Strict;
        if strict && (descriptions.len() != prices.len() || prices.len() != links.len()) {
            return Err(ExtractionError::LengthMismatch {
                descriptions: descriptions.len(),
                prices: prices.len(),
                links: links.len(),
            });
        }

        let mut listings = Vec::with_capacity(descriptions.len().min(prices.len()).min(links.len()));
        for (index, ((description, price), link)) in descriptions
            .iter()
            .zip(prices.iter())
            .zip(links.iter())
            .enumerate()
        {
            let description = session.text(description).await?.trim().to_string();
            let price = session.text(price).await?.trim().to_string();
            let href = session.attribute(link, "href").await?;

            if strict && href.is_none() {
                return Err(ExtractionError::MissingHref { index });
            }

            listings.push(RawListing {
                description,
                price,
                href,
            });
        }

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::session::{RenderSession, SessionLauncher};
    use crate::infrastructure::static_page::{StaticLauncher, StaticSession};
    use crate::test_utils::listing_page;
    use proptest::prelude::*;

    fn selectors(content_area: &str) -> SelectorSet {
        SelectorSet {
            content_area: content_area.to_string(),
            description: ".d".to_string(),
            price: ".p".to_string(),
            link: ".a".to_string(),
        }
    }

    async fn session_for(html: String) -> StaticSession {
        let launcher = StaticLauncher::from_fixtures([("http://shop.test/", html)]);
        let mut session = launcher.launch().await.unwrap();
        session.navigate("http://shop.test/").await.unwrap();
        session
    }

    fn uneven_page(descriptions: usize, prices: usize, links: usize) -> String {
        let mut body = String::from("<html><body><div class=\"list\">");
        for i in 0..descriptions {
            body.push_str(&format!("<span class=\"d\">item {i}</span>"));
        }
        for i in 0..prices {
            body.push_str(&format!("<span class=\"p\">{i}.00</span>"));
        }
        for i in 0..links {
            body.push_str(&format!("<a class=\"a\" href=\"/item/{i}\">go</a>"));
        }
        body.push_str("</div></body></html>");
        body
    }

    #[tokio::test]
    async fn test_extracts_triples_in_document_order() {
        let html = listing_page(&[
            ("  Kettle ", " $20.00 ", Some("/kettle")),
            ("Toaster", "$35.50", Some("/toaster")),
        ]);
        let mut session = session_for(html).await;
        let selectors = selectors(".list");

        let listings = SelectorExtractor::new(&selectors, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();

        assert_eq!(
            listings,
            vec![
                RawListing {
                    description: "Kettle".into(),
                    price: "$20.00".into(),
                    href: Some("/kettle".into()),
                },
                RawListing {
                    description: "Toaster".into(),
                    price: "$35.50".into(),
                    href: Some("/toaster".into()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_content_area_limits_scope() {
        let mut html = listing_page(&[("Inside", "1", Some("/in"))]);
        html = html.replace(
            "</body>",
            "<span class=\"d\">Outside</span><span class=\"p\">2</span><a class=\"a\" href=\"/out\">x</a></body>",
        );
        let mut session = session_for(html).await;

        let scoped = selectors(".list");
        let listings = SelectorExtractor::new(&scoped, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].description, "Inside");

        let document = selectors("");
        let listings = SelectorExtractor::new(&document, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();
        assert_eq!(listings.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_content_area_yields_nothing() {
        let mut session = session_for(listing_page(&[("A", "1", Some("/a"))])).await;
        let selectors = selectors(".does-not-exist");
        let listings = SelectorExtractor::new(&selectors, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_no_prices_means_no_listings() {
        let mut session = session_for(uneven_page(5, 0, 5)).await;
        let selectors = selectors(".list");
        let listings = SelectorExtractor::new(&selectors, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();
        assert!(listings.is_empty());
    }

    #[tokio::test]
    async fn test_missing_href_propagates_as_none() {
        let mut session = session_for(listing_page(&[("A", "1", None)])).await;
        let selectors = selectors(".list");
        let listings = SelectorExtractor::new(&selectors, Strictness::Lenient)
            .extract(&mut session)
            .await
            .unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].href, None);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_uneven_collections() {
        let mut session = session_for(uneven_page(3, 2, 3)).await;
        let selectors = selectors(".list");
        let err = SelectorExtractor::new(&selectors, Strictness::Strict)
            .extract(&mut session)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::LengthMismatch {
                descriptions: 3,
                prices: 2,
                links: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_missing_href() {
        let mut session =
            session_for(listing_page(&[("A", "1", Some("/a")), ("B", "2", None)])).await;
        let selectors = selectors(".list");
        let err = SelectorExtractor::new(&selectors, Strictness::Strict)
            .extract(&mut session)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingHref { index: 1 }));
    }

    #[tokio::test]
    async fn test_count_matches_extract_without_reading_content() {
        let mut session = session_for(uneven_page(4, 3, 5)).await;
        let scoped = selectors(".list");
        let extractor = SelectorExtractor::new(&scoped, Strictness::Lenient);

        let counts = extractor.count(&mut session).await.unwrap();
        assert_eq!(
            counts,
            ListingCounts {
                descriptions: 4,
                prices: 3,
                links: 5
            }
        );
        assert_eq!(counts.complete(), extractor.extract(&mut session).await.unwrap().len());

        let missing = selectors(".nowhere");
        let counts = SelectorExtractor::new(&missing, Strictness::Lenient)
            .count(&mut session)
            .await
            .unwrap();
        assert_eq!(counts, ListingCounts::default());
    }

    proptest! {
        #[test]
        fn prop_yields_min_of_collection_sizes(a in 0usize..6, b in 0usize..6, c in 0usize..6) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let listings = runtime.block_on(async {
                let mut session = session_for(uneven_page(a, b, c)).await;
                let selectors = selectors(".list");
                SelectorExtractor::new(&selectors, Strictness::Lenient)
                    .extract(&mut session)
                    .await
                    .unwrap()
            });

            prop_assert_eq!(listings.len(), a.min(b).min(c));
            for (i, listing) in listings.iter().enumerate() {
                prop_assert_eq!(&listing.description, &format!("item {i}"));
                prop_assert_eq!(&listing.price, &format!("{i}.00"));
                let expected_href = format!("/item/{i}");
                prop_assert_eq!(listing.href.as_deref(), Some(expected_href.as_str()));
            }
        }
    }
}
