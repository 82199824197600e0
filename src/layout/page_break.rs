//! # Page Break Decisions
//!
//! Splitting a flat list of block heights into page-sized chunks. This is the
//! arithmetic half of `MultiPage`: the widget measures its children, hands
//! the heights here, and paints whatever chunks come back.
//!
//! The rules are greedy and never backtrack:
//!
//! - A block goes on the current page if it still fits.
//! - Otherwise the page closes and the block opens the next one.
//! - The first block on an empty page is always accepted, however tall. A
//!   block taller than a page is never split; it overflows its page alone.
//! - At most `max_pages` chunks are produced; the rest is reported as
//!   truncated so the caller can warn about it.

use std::ops::Range;

/// What to do with the next block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// Place the block on the current page.
    Place,
    /// Close the current page and start the next one with this block.
    MoveToNextPage,
}

/// Decide where the next block of `height` goes, given what is already on
/// the page.
pub fn decide_break(
    used_height: f64,
    height: f64,
    available_height: f64,
    page_is_empty: bool,
) -> BreakDecision {
    if page_is_empty || used_height + height <= available_height {
        BreakDecision::Place
    } else {
        BreakDecision::MoveToNextPage
    }
}

/// One output page worth of blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChunk {
    /// Indices into the original block list.
    pub widgets: Range<usize>,
    /// Offset of the chunk's first block in the unpaginated content flow.
    pub start_offset: f64,
    /// Offset just past the chunk's last block.
    pub end_offset: f64,
    /// 1-based page number.
    pub page_number: usize,
}

impl ContentChunk {
    pub fn height(&self) -> f64 {
        self.end_offset - self.start_offset
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub chunks: Vec<ContentChunk>,
    /// Blocks dropped because `max_pages` was reached. Always a suffix.
    pub truncated: Range<usize>,
    /// Blocks taller than a whole page. Each sits alone on its page.
    pub oversized: Vec<usize>,
}

impl Pagination {
    pub fn is_truncated(&self) -> bool {
        !self.truncated.is_empty()
    }
}

/// Greedily split `heights` into chunks no taller than `available_height`.
pub fn paginate(heights: &[f64], available_height: f64, max_pages: usize) -> Pagination {
    let mut chunks: Vec<ContentChunk> = Vec::new();
    let mut oversized = Vec::new();

    let mut start = 0;
    let mut used = 0.0;
    let mut flow = 0.0;

    for (i, &h) in heights.iter().enumerate() {
        if h > available_height {
            oversized.push(i);
        }
        if decide_break(used, h, available_height, i == start) == BreakDecision::MoveToNextPage {
            chunks.push(ContentChunk {
                widgets: start..i,
                start_offset: flow - used,
                end_offset: flow,
                page_number: chunks.len() + 1,
            });
            start = i;
            used = 0.0;
        }
        used += h;
        flow += h;
    }
    if start < heights.len() {
        chunks.push(ContentChunk {
            widgets: start..heights.len(),
            start_offset: flow - used,
            end_offset: flow,
            page_number: chunks.len() + 1,
        });
    }

    let truncated = if chunks.len() > max_pages {
        let first_dropped = chunks[max_pages].widgets.start;
        chunks.truncate(max_pages);
        first_dropped..heights.len()
    } else {
        heights.len()..heights.len()
    };
    oversized.retain(|i| *i < truncated.start);

    Pagination {
        chunks,
        truncated,
        oversized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(p: &Pagination) -> Vec<Range<usize>> {
        p.chunks.iter().map(|c| c.widgets.clone()).collect()
    }

    #[test]
    fn everything_fits() {
        assert_eq!(decide_break(20.0, 30.0, 100.0, false), BreakDecision::Place);
        let p = paginate(&[20.0, 30.0, 40.0], 100.0, 10);
        assert_eq!(ranges(&p), vec![0..3]);
        assert!(!p.is_truncated());
    }

    #[test]
    fn five_equal_blocks_over_three_pages() {
        let p = paginate(&[200.0; 5], 500.0, 10);
        assert_eq!(ranges(&p), vec![0..2, 2..4, 4..5]);
        assert_eq!(p.chunks[1].start_offset, 400.0);
        assert_eq!(p.chunks[1].end_offset, 800.0);
        assert_eq!(p.chunks[2].page_number, 3);
    }

    #[test]
    fn exact_fit_stays_on_page() {
        let p = paginate(&[250.0, 250.0, 1.0], 500.0, 10);
        assert_eq!(ranges(&p), vec![0..2, 2..3]);
    }

    #[test]
    fn oversized_block_gets_its_own_page() {
        assert_eq!(decide_break(0.0, 900.0, 500.0, true), BreakDecision::Place);
        let p = paginate(&[100.0, 900.0, 100.0], 500.0, 10);
        assert_eq!(ranges(&p), vec![0..1, 1..2, 2..3]);
        assert_eq!(p.oversized, vec![1]);
    }

    #[test]
    fn max_pages_drops_the_remaining_suffix() {
        let p = paginate(&[300.0; 6], 500.0, 2);
        assert_eq!(ranges(&p), vec![0..1, 1..2]);
        assert_eq!(p.truncated, 2..6);
    }

    #[test]
    fn chunks_conserve_the_block_list() {
        let heights = [120.0, 40.0, 330.0, 10.0, 10.0, 600.0, 0.0, 250.0, 250.0, 90.0];
        for max_pages in [1, 2, 3, 100] {
            let p = paginate(&heights, 400.0, max_pages);
            let mut seen: Vec<usize> = p.chunks.iter().flat_map(|c| c.widgets.clone()).collect();
            seen.extend(p.truncated.clone());
            assert_eq!(seen, (0..heights.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn empty_input_produces_no_pages() {
        let p = paginate(&[], 500.0, 3);
        assert!(p.chunks.is_empty());
        assert!(!p.is_truncated());
    }
}
