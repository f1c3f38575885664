//! Embedding-text construction
//!
//! Each embedding space gets its own textual rendering of a product, so the
//! same catalog entry lands in different regions of the two spaces: the
//! similar text describes what the product *is*, the complementary text
//! describes what it is *used with*.

use reco_core::{EmbeddingSpace, Product};

const SIM_DESCRIPTION_BUDGET: usize = 220;
const COMP_DESCRIPTION_BUDGET: usize = 200;

/// Build the embedding text for a product in the given space
pub fn embedding_text(space: EmbeddingSpace, product: &Product) -> String {
    match space {
        EmbeddingSpace::Similar => similar_text(product),
        EmbeddingSpace::Complementary => complementary_text(product),
    }
}

/// Identity-focused rendering: name, brand, description, tags
fn similar_text(product: &Product) -> String {
    join_parts(&[
        Some(product.name.clone()),
        product.brand.clone(),
        truncated_description(product, SIM_DESCRIPTION_BUDGET),
        joined_tags(product),
    ])
}

/// Co-usage-focused rendering with an instruction biasing the embedding
/// toward items used together, regardless of which one is the accessory
fn complementary_text(product: &Product) -> String {
    join_parts(&[
        Some(format!("Product name: {}", product.name)),
        product.brand.as_ref().map(|b| format!("Brand: {}", b)),
        product
            .category_id
            .as_ref()
            .map(|c| format!("Category: {}", c)),
        product
            .category_path
            .as_ref()
            .map(|p| format!("Category Path: {}", p)),
        joined_tags(product).map(|t| format!("Tags: {}", t)),
        Some(
            "Find products commonly used, worn, or purchased together with this item \
             (either as base or accessory)."
                .to_string(),
        ),
        truncated_description(product, COMP_DESCRIPTION_BUDGET),
    ])
}

fn join_parts(parts: &[Option<String>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" | ")
}

fn joined_tags(product: &Product) -> Option<String> {
    if product.tags.is_empty() {
        None
    } else {
        Some(product.tags.join(" "))
    }
}

fn truncated_description(product: &Product, budget: usize) -> Option<String> {
    product.description.as_ref().map(|description| {
        // Char-boundary-safe truncation
        description.chars().take(budget).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product::new("P1", "Trail Runner")
            .with_brand("Acme")
            .with_description("Lightweight trail running shoe")
            .with_category("shoes-running")
            .with_category_path("apparel/shoes/running")
            .with_tags(vec!["trail".to_string(), "running".to_string()])
    }

    #[test]
    fn test_similar_text_lists_identity_fields() {
        let text = embedding_text(EmbeddingSpace::Similar, &product());
        assert_eq!(
            text,
            "Trail Runner | Acme | Lightweight trail running shoe | trail running"
        );
    }

    #[test]
    fn test_complementary_text_carries_co_usage_instruction() {
        let text = embedding_text(EmbeddingSpace::Complementary, &product());
        assert!(text.starts_with("Product name: Trail Runner | Brand: Acme"));
        assert!(text.contains("Category: shoes-running"));
        assert!(text.contains("purchased together with this item"));
    }

    #[test]
    fn test_missing_fields_are_skipped_not_rendered_empty() {
        let bare = Product::new("P2", "Socks");
        let text = embedding_text(EmbeddingSpace::Similar, &bare);
        assert_eq!(text, "Socks");
        assert!(!text.contains('|'));
    }

    #[test]
    fn test_spaces_produce_different_texts() {
        let p = product();
        assert_ne!(
            embedding_text(EmbeddingSpace::Similar, &p),
            embedding_text(EmbeddingSpace::Complementary, &p)
        );
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = Product::new("P3", "Widget").with_description(&"x".repeat(1000));
        let text = embedding_text(EmbeddingSpace::Similar, &long);
        assert!(text.len() < 300);
    }
}
