use std::num::NonZeroU32;

use crate::application::render::types::ContentMetrics;

pub(crate) fn build_content_metrics(
    source: &str,
    code_blocks: usize,
    links: usize,
    words_per_minute: NonZeroU32,
) -> ContentMetrics {
    let word_count = saturating_u32(source.split_whitespace().count());

    ContentMetrics {
        word_count,
        reading_time_minutes: reading_time_minutes(word_count, words_per_minute),
        code_blocks_count: saturating_u32(code_blocks),
        links_count: saturating_u32(links),
    }
}

/// Whole minutes, rounded up. Any non-empty document takes at least a minute.
pub(crate) fn reading_time_minutes(word_count: u32, words_per_minute: NonZeroU32) -> u32 {
    if word_count == 0 {
        return 0;
    }
    word_count.div_ceil(words_per_minute.get()).max(1)
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
