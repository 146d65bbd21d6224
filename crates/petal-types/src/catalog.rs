use std::sync::LazyLock;

use crate::models::Flower;

/// (id, name, meaning). Slug and image reference are the lower-cased name.
const SEED: &[(&str, &str, &str)] = &[
    ("1", "Rose", "For love, admiration, or remembrance."),
    ("2", "Tulip", "A declaration of perfect love."),
    ("3", "Lily", "For sympathy, humility, and rebirth."),
    ("4", "Daisy", "Innocence, purity, and new beginnings."),
    ("5", "Sunflower", "Adoration, loyalty, and longevity."),
    ("6", "Orchid", "Rare beauty, strength, and love."),
    ("7", "Carnation", "For fascination, distinction, and love."),
    ("8", "Peony", "Romance, prosperity, and good fortune."),
    ("9", "Lavender", "Calmness, serenity, and devotion."),
];

static FLOWERS: LazyLock<Vec<Flower>> = LazyLock::new(|| {
    SEED.iter()
        .map(|(id, name, meaning)| {
            let slug = name.to_lowercase();
            Flower {
                id: id.to_string(),
                name: name.to_string(),
                image_ref: slug.clone(),
                slug,
                meaning: meaning.to_string(),
            }
        })
        .collect()
});

pub fn all() -> &'static [Flower] {
    &FLOWERS
}

pub fn lookup(id: &str) -> Option<&'static Flower> {
    FLOWERS.iter().find(|f| f.id == id)
}

pub fn lookup_by_slug(slug: &str) -> Option<&'static Flower> {
    FLOWERS.iter().find(|f| f.slug == slug)
}

/// Resolve a flower reference given either as an id or a slug.
pub fn resolve(reference: &str) -> Option<&'static Flower> {
    lookup(reference).or_else(|| lookup_by_slug(reference))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn slugs_are_unique() {
        let slugs: HashSet<_> = all().iter().map(|f| f.slug.as_str()).collect();
        assert_eq!(slugs.len(), all().len());
        assert_eq!(all().len(), 9);
    }

    #[test]
    fn lookup_by_id_and_slug_agree() {
        let by_id = lookup("5").unwrap();
        let by_slug = lookup_by_slug("sunflower").unwrap();
        assert_eq!(by_id, by_slug);
        assert_eq!(by_id.image_ref, "sunflower");
    }

    #[test]
    fn resolve_accepts_either_reference() {
        assert_eq!(resolve("peony").map(|f| f.id.as_str()), Some("8"));
        assert_eq!(resolve("8").map(|f| f.slug.as_str()), Some("peony"));
        assert!(resolve("cactus").is_none());
    }
}
