use serde::{Deserialize, Serialize};

/// Page of results in the backend's `count/next/previous/results` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Number of pages for the given page size (at least one).
    pub fn total_pages(&self, page_size: u32) -> u64 {
        let size = u64::from(page_size.max(1));
        self.count.div_ceil(size).max(1)
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// List endpoint body: paginated when the backend's pagination applies to the
/// view, a bare array otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Paginated<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page(page) => page.results,
            Listing::Plain(items) => items,
        }
    }
}

/// A related object that the backend serializes either as a bare id or nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(u64),
    Full(Box<T>),
}

impl<T> Ref<T> {
    pub fn full(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Full(inner) => Some(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Paginated<u32> = Paginated {
            count: 21,
            next: Some("p2".into()),
            previous: None,
            results: vec![],
        };
        assert_eq!(page.total_pages(10), 3);
        assert_eq!(page.total_pages(0), 21);
        assert!(page.has_next());
    }

    #[test]
    fn test_listing_accepts_page_or_array() {
        let plain: Listing<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(plain.into_items(), vec![1, 2]);

        let page: Listing<u32> =
            serde_json::from_str(r#"{"count": 1, "next": null, "previous": null, "results": [5]}"#)
                .unwrap();
        assert_eq!(page.into_items(), vec![5]);
    }

    #[test]
    fn test_ref_accepts_id_or_object() {
        #[derive(Debug, PartialEq, Deserialize, Serialize)]
        struct Named {
            name: String,
        }

        let id: Ref<Named> = serde_json::from_str("3").unwrap();
        assert_eq!(id, Ref::Id(3));

        let full: Ref<Named> = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(full.full().map(|n| n.name.as_str()), Some("x"));
    }
}
