//! Image-based product recognition.
//!
//! Single stage, no fallback: without a configured labeler the path returns
//! `None` immediately, and any labeler failure also ends in `None`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::resolver::{within, Lookup};
use crate::adapters::{ImageAnnotations, ImageLabeler};
use crate::domain::ProductIdentity;
use crate::extract::{extract_brand, extract_quantity, extract_size};

/// Labels too generic to serve as a category
const GENERIC_LABELS: &[&str] = &["product", "package", "bottle", "food", "drink", "container"];

/// Number of labels joined into the description
const DESCRIPTION_LABELS: usize = 5;

/// Image resolver around an optional labeling provider
#[derive(Clone)]
pub struct ImageResolver {
    labeler: Option<Arc<dyn ImageLabeler>>,
    timeout: Duration,
}

impl ImageResolver {
    pub fn new(labeler: Option<Arc<dyn ImageLabeler>>, timeout: Duration) -> Self {
        Self { labeler, timeout }
    }

    /// Resolver with no recognition capability
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    pub fn is_enabled(&self) -> bool {
        self.labeler.is_some()
    }

    /// Recognize a product; returns the labeler name with the identity
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn resolve(&self, image: &[u8]) -> Option<(String, ProductIdentity)> {
        let Some(labeler) = &self.labeler else {
            debug!("No image labeler configured");
            return None;
        };

        let lookup: Lookup<ImageAnnotations> =
            within(self.timeout, labeler.annotate(image)).await.into();

        match lookup {
            Lookup::Found(annotations) => {
                let product = identity_from_annotations(&annotations);
                info!(product = %product.name, "Image recognized");
                Some((labeler.name().to_string(), product))
            }
            Lookup::NotFound => {
                info!("No results from image labeler");
                None
            }
            Lookup::Unavailable(err) => {
                warn!(stage = labeler.name(), error = %err, "Image recognition failed");
                None
            }
        }
    }
}

/// Build a product identity from image annotations
pub fn identity_from_annotations(annotations: &ImageAnnotations) -> ProductIdentity {
    let name = annotations
        .objects
        .first()
        .or_else(|| annotations.labels.first())
        .cloned()
        .unwrap_or_else(|| "Unknown Product".to_string());

    let category = annotations
        .labels
        .iter()
        .find(|label| !GENERIC_LABELS.contains(&label.to_lowercase().as_str()))
        .or_else(|| annotations.labels.get(1))
        .cloned();

    let description = Some(
        annotations
            .labels
            .iter()
            .take(DESCRIPTION_LABELS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    )
    .filter(|d| !d.is_empty());

    ProductIdentity {
        name,
        brand: extract_brand(
            &annotations.text,
            annotations.logos.first().map(String::as_str),
        ),
        category,
        description,
        image_ref: None,
        barcode: None,
        size: extract_size(&annotations.text),
        quantity: extract_quantity(&annotations.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProviderError;
    use async_trait::async_trait;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_object_label_preferred_for_name() {
        let annotations = ImageAnnotations {
            labels: strings(&["Drink", "Bottle", "Soft drink", "Cola"]),
            logos: strings(&["Coca-Cola"]),
            objects: strings(&["Bottle"]),
            text: "Coca-Cola\n12 fl oz\n6 pack".to_string(),
        };

        let product = identity_from_annotations(&annotations);
        assert_eq!(product.name, "Bottle");
        assert_eq!(product.brand.as_deref(), Some("Coca-Cola"));
        assert_eq!(product.category.as_deref(), Some("Soft drink"));
        assert_eq!(product.description.as_deref(), Some("Drink, Bottle, Soft drink, Cola"));
        assert_eq!(product.size.as_deref(), Some("12 fl oz"));
        assert_eq!(product.quantity, Some(6));
    }

    #[test]
    fn test_falls_back_to_top_label_then_unknown() {
        let labels_only = ImageAnnotations {
            labels: strings(&["Cereal", "Breakfast"]),
            text: "KELLOGG'S\nCorn Flakes".to_string(),
            ..Default::default()
        };
        let product = identity_from_annotations(&labels_only);
        assert_eq!(product.name, "Cereal");
        assert_eq!(product.brand.as_deref(), Some("KELLOGG'S"));

        let product = identity_from_annotations(&ImageAnnotations::default());
        assert_eq!(product.name, "Unknown Product");
        assert_eq!(product.category, None);
        assert_eq!(product.description, None);
        assert_eq!(product.brand, None);
    }

    #[test]
    fn test_all_generic_labels_use_second_label() {
        let annotations = ImageAnnotations {
            labels: strings(&["Food", "Package"]),
            ..Default::default()
        };
        let product = identity_from_annotations(&annotations);
        assert_eq!(product.category.as_deref(), Some("Package"));
    }

    struct FailingLabeler;

    #[async_trait]
    impl ImageLabeler for FailingLabeler {
        fn name(&self) -> &str {
            "failing"
        }

        async fn annotate(&self, _image: &[u8]) -> Result<Option<ImageAnnotations>, ProviderError> {
            Err(ProviderError::Status(403, "forbidden".into()))
        }
    }

    #[tokio::test]
    async fn test_disabled_resolver_returns_none() {
        assert!(ImageResolver::disabled().resolve(b"jpeg").await.is_none());
    }

    #[tokio::test]
    async fn test_labeler_failure_returns_none() {
        let resolver = ImageResolver::new(Some(Arc::new(FailingLabeler)), Duration::from_secs(1));
        assert!(resolver.is_enabled());
        assert!(resolver.resolve(b"jpeg").await.is_none());
    }
}
