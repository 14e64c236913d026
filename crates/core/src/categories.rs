//! Server-side categories offered by the front end.

/// A listing category and how it is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    /// Value sent as the `category` query parameter; empty for all games.
    pub slug: &'static str,
    /// Short label for category buttons.
    pub label: &'static str,
}

/// Categories in the order the front end presents them.
pub const CATEGORIES: [Category; 6] = [
    Category { slug: "", label: "All" },
    Category { slug: "shooter", label: "Shooter" },
    Category { slug: "mmorpg", label: "MMORPG" },
    Category { slug: "strategy", label: "Strategy" },
    Category { slug: "racing", label: "Racing" },
    Category { slug: "sports", label: "Sports" },
];

/// Page title for a category slug. Unknown slugs fall back to `Games`.
pub fn display_name(slug: &str) -> &'static str {
    match slug {
        "" => "All Games",
        "shooter" => "Shooter Games",
        "mmorpg" => "MMORPG Games",
        "strategy" => "Strategy Games",
        "racing" => "Racing Games",
        "sports" => "Sports Games",
        _ => "Games",
    }
}

/// Position of `slug` in [`CATEGORIES`].
pub fn index_of(slug: &str) -> Option<usize> {
    CATEGORIES.iter().position(|category| category.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(display_name(""), "All Games");
        assert_eq!(display_name("mmorpg"), "MMORPG Games");
        assert_eq!(display_name("card"), "Games");
        for category in CATEGORIES {
            assert_ne!(display_name(category.slug), "Games");
        }
    }

    #[test]
    fn lookup_by_slug() {
        assert_eq!(index_of(""), Some(0));
        assert_eq!(index_of("sports"), Some(5));
        assert_eq!(index_of("card"), None);
    }
}
