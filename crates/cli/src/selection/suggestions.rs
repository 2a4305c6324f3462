use cmdchain_core::block_definitions::BlockDefinition;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// The block ID that best matches `query`, checked against IDs and titles.
///
/// Returns `None` when nothing matches at all.
pub fn suggest_block_id<'a>(
    query: &str,
    definitions: impl IntoIterator<Item = &'a BlockDefinition>,
) -> Option<&'a str> {
    let matcher = SkimMatcherV2::default();

    definitions
        .into_iter()
        .filter_map(|definition| {
            let score = [&definition.id, &definition.title]
                .iter()
                .filter_map(|choice| matcher.fuzzy_match(choice, query))
                .max()?;
            Some((score, definition.id.as_str()))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, id)| id)
}
