use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::treemap::Treemap;

pub fn fuzzy_score(needle: &str, hay: &str) -> Option<i64> {
    let m = SkimMatcherV2::default();
    m.fuzzy_match(hay, needle)
}

/// Tiles matching `needle` by name or category, best match first, as
/// `(tile index, score)`. An empty needle matches nothing.
pub fn search_tiles(treemap: &Treemap, needle: &str) -> Vec<(usize, i64)> {
    let needle = needle.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    let m = SkimMatcherV2::default();
    let mut hits: Vec<(usize, i64)> = treemap
        .tiles
        .iter()
        .enumerate()
        .filter_map(|(i, t)| {
            let by_name = m.fuzzy_match(&t.name, needle);
            let by_category = m.fuzzy_match(&t.category, needle);
            by_name.max(by_category).map(|score| (i, score))
        })
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hits
}
