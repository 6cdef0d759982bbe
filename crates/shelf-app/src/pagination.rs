// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const FIRST_PAGE: u32 = 1;

/// Number of books the service returns per page.
pub const PAGE_SIZE: usize = 10;

/// Effective page index after clamping against the page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub index: u32,
    /// The requested index was above `max(total_pages, 1)` and was pulled
    /// down. Only this case rewrites the location on a passive load.
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMove {
    Next,
    Prev,
    Jump(String),
}

/// Parses a raw `i` query value. Anything that is not a decimal integer is
/// treated as absent.
pub fn parse_index(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

pub fn resolve(url_index: Option<i64>, total_pages: u32) -> Resolution {
    let requested = match url_index {
        Some(value) if value > 0 => value,
        _ => i64::from(FIRST_PAGE),
    };

    let last_page = total_pages.max(FIRST_PAGE);
    if requested > i64::from(last_page) {
        return Resolution {
            index: last_page,
            clamped: true,
        };
    }

    let index = u32::try_from(requested).unwrap_or(FIRST_PAGE);
    Resolution {
        index,
        clamped: false,
    }
}

/// Pulls a pagination candidate down to the last known page, if any.
pub fn clamp_to_known(index: u32, total_pages: Option<u32>) -> u32 {
    match total_pages {
        Some(total) => index.min(total.max(FIRST_PAGE)),
        None => index,
    }
}

/// Candidate index for a pagination interaction, clamped at the lower bound
/// only. The upper bound is applied once the page count is known.
pub fn candidate(current: Option<i64>, page_move: &PageMove) -> u32 {
    let current = current
        .filter(|value| *value > 0)
        .unwrap_or(i64::from(FIRST_PAGE));
    let next = match page_move {
        PageMove::Next => current.saturating_add(1),
        PageMove::Prev => current.saturating_sub(1),
        PageMove::Jump(raw) => parse_index(raw).unwrap_or(i64::from(FIRST_PAGE)),
    };

    if next <= i64::from(FIRST_PAGE) {
        return FIRST_PAGE;
    }
    u32::try_from(next).unwrap_or(u32::MAX)
}

pub fn total_pages_for(book_count: usize) -> u32 {
    u32::try_from(book_count.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        PageMove, Resolution, candidate, clamp_to_known, parse_index, resolve, total_pages_for,
    };

    #[test]
    fn resolve_clamps_above_page_count() {
        assert_eq!(
            resolve(Some(5), 3),
            Resolution {
                index: 3,
                clamped: true
            }
        );
    }

    #[test]
    fn resolve_defaults_non_positive_and_absent_to_first_page() {
        assert_eq!(resolve(Some(0), 10).index, 1);
        assert_eq!(resolve(Some(-4), 10).index, 1);
        assert_eq!(resolve(None, 0).index, 1);
        assert!(!resolve(Some(0), 10).clamped);
    }

    #[test]
    fn resolve_keeps_in_range_index_unclamped() {
        assert_eq!(
            resolve(Some(2), 10),
            Resolution {
                index: 2,
                clamped: false
            }
        );
    }

    #[test]
    fn resolve_with_zero_pages_is_always_first_page() {
        for requested in [None, Some(-1), Some(0), Some(1)] {
            let resolution = resolve(requested, 0);
            assert_eq!(resolution.index, 1, "requested {requested:?}");
            assert!(!resolution.clamped);
        }
        for requested in [Some(2), Some(4), Some(7), Some(i64::MAX)] {
            assert_eq!(
                resolve(requested, 0),
                Resolution {
                    index: 1,
                    clamped: true
                },
                "requested {requested:?}"
            );
        }
    }

    #[test]
    fn known_page_count_caps_pagination_candidates() {
        assert_eq!(clamp_to_known(4, Some(3)), 3);
        assert_eq!(clamp_to_known(2, Some(3)), 2);
        assert_eq!(clamp_to_known(5, Some(0)), 1);
        assert_eq!(clamp_to_known(9, None), 9);
    }

    #[test]
    fn resolve_stays_within_bounds_for_all_inputs() {
        let requests = [
            None,
            Some(i64::MIN),
            Some(-10),
            Some(-1),
            Some(0),
            Some(1),
            Some(2),
            Some(9),
            Some(10),
            Some(11),
            Some(1_000),
            Some(i64::from(u32::MAX) + 5),
            Some(i64::MAX),
        ];
        for total in [0_u32, 1, 2, 3, 10, 99_999, u32::MAX] {
            for requested in requests {
                let index = resolve(requested, total).index;
                assert!(index >= 1, "total {total} requested {requested:?}");
                assert!(
                    index <= total.max(1),
                    "total {total} requested {requested:?} got {index}"
                );
            }
        }
    }

    #[test]
    fn parse_index_rejects_garbage() {
        assert_eq!(parse_index("4"), Some(4));
        assert_eq!(parse_index(" 12 "), Some(12));
        assert_eq!(parse_index("-3"), Some(-3));
        assert_eq!(parse_index("abc"), None);
        assert_eq!(parse_index("3.5"), None);
        assert_eq!(parse_index(""), None);
    }

    #[test]
    fn prev_at_first_page_stays_on_first_page() {
        assert_eq!(candidate(Some(1), &PageMove::Prev), 1);
        assert_eq!(candidate(None, &PageMove::Prev), 1);
    }

    #[test]
    fn next_advances_from_current_or_first_page() {
        assert_eq!(candidate(Some(4), &PageMove::Next), 5);
        assert_eq!(candidate(None, &PageMove::Next), 2);
        assert_eq!(candidate(Some(-8), &PageMove::Next), 2);
    }

    #[test]
    fn jump_uses_entered_value_or_first_page() {
        assert_eq!(candidate(Some(4), &PageMove::Jump("9".to_owned())), 9);
        assert_eq!(candidate(Some(4), &PageMove::Jump("0".to_owned())), 1);
        assert_eq!(candidate(Some(4), &PageMove::Jump("nine".to_owned())), 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages_for(0), 0);
        assert_eq!(total_pages_for(1), 1);
        assert_eq!(total_pages_for(10), 1);
        assert_eq!(total_pages_for(11), 2);
    }
}
