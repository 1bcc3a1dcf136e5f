use std::collections::BTreeMap;

use aq_core::{PageAnalysis, PageType};

/// Groups pages by their detected `PageType`. Groups are returned in a
/// stable order (the `PageType` discriminant order) so that repeated runs
/// over the same `AppModel` emit features in the same sequence.
pub fn group_by_page_type<'a>(pages: &'a [PageAnalysis]) -> Vec<(PageType, Vec<&'a PageAnalysis>)> {
    let mut groups: BTreeMap<u8, (PageType, Vec<&'a PageAnalysis>)> = BTreeMap::new();
    for page in pages {
        let key = page_type_rank(page.page_type);
        groups.entry(key).or_insert_with(|| (page.page_type, Vec::new())).1.push(page);
    }
    groups.into_values().collect()
}

fn page_type_rank(page_type: PageType) -> u8 {
    match page_type {
        PageType::Landing => 0,
        PageType::Auth => 1,
        PageType::Registration => 2,
        PageType::Search => 3,
        PageType::Listing => 4,
        PageType::Detail => 5,
        PageType::Form => 6,
        PageType::Dashboard => 7,
        PageType::Checkout => 8,
        PageType::Error => 9,
        PageType::Other => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn page(url: &str, page_type: PageType) -> PageAnalysis {
        PageAnalysis {
            url: url.to_string(),
            title: String::new(),
            page_type,
            purpose: String::new(),
            elements: vec![],
            interactions: vec![],
            data_inputs: vec![],
            navigation: vec![],
            accessibility_issues: None,
            dom_fingerprint: "f".into(),
            load_latency: Duration::from_millis(1),
            analyzed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn groups_pages_by_type_in_stable_order() {
        let pages = vec![page("https://x/a", PageType::Checkout), page("https://x/b", PageType::Auth), page("https://x/c", PageType::Auth)];
        let groups = group_by_page_type(&pages);
        let types: Vec<PageType> = groups.iter().map(|(t, _)| *t).collect();
        assert_eq!(types, vec![PageType::Auth, PageType::Checkout]);
        assert_eq!(groups[0].1.len(), 2);
    }
}
