//! Rank tiers computed from cumulative activity counters.

/// A rank tier with inclusive ceilings on both counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankTier {
    /// Display label for the tier.
    pub name: &'static str,
    /// Highest `topics_created` count the tier covers.
    pub max_topics: i32,
    /// Highest `replies_written` count the tier covers.
    pub max_replies: i32,
}

/// Tiers in non-decreasing ceiling order. The final tier is terminal and
/// absorbs every count the earlier tiers do not cover.
pub const RANKS: [RankTier; 10] = [
    RankTier { name: "Newcomer", max_topics: 4, max_replies: 9 },
    RankTier { name: "Visitor", max_topics: 9, max_replies: 24 },
    RankTier { name: "Member", max_topics: 19, max_replies: 49 },
    RankTier { name: "Activist", max_topics: 34, max_replies: 99 },
    RankTier { name: "Author", max_topics: 54, max_replies: 199 },
    RankTier { name: "Thinker", max_topics: 84, max_replies: 399 },
    RankTier { name: "Debater", max_topics: 129, max_replies: 699 },
    RankTier { name: "Philosopher", max_topics: 199, max_replies: 1199 },
    RankTier { name: "Master", max_topics: 299, max_replies: 1999 },
    RankTier { name: "Legend", max_topics: i32::MAX, max_replies: i32::MAX },
];

/// Index of the tier covering the given counters.
///
/// The first tier whose ceilings both dominate the counters wins. Because a
/// tier that fails for some counts also fails for any larger counts, the
/// selected index never decreases as either counter grows.
#[must_use]
pub fn rank_index(topics_created: i32, replies_written: i32) -> usize {
    RANKS
        .iter()
        .position(|tier| topics_created <= tier.max_topics && replies_written <= tier.max_replies)
        .unwrap_or(RANKS.len() - 1)
}

/// Tier covering the given counters.
#[must_use]
pub fn rank_for(topics_created: i32, replies_written: i32) -> &'static RankTier {
    &RANKS[rank_index(topics_created, replies_written)]
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0, "Newcomer")]
    #[case(4, 9, "Newcomer")]
    #[case(5, 0, "Visitor")]
    #[case(0, 10, "Visitor")]
    #[case(20, 50, "Activist")]
    #[case(300, 0, "Legend")]
    #[case(0, 2000, "Legend")]
    fn picks_first_dominating_tier(
        #[case] topics: i32,
        #[case] replies: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(rank_for(topics, replies).name, expected);
    }

    #[test]
    fn index_is_monotonic_in_both_counters() {
        let probes = [0, 1, 4, 5, 9, 10, 34, 100, 250, 5000];
        for &t in &probes {
            for &r in &probes {
                let base = rank_index(t, r);
                assert!(rank_index(t + 1, r) >= base);
                assert!(rank_index(t, r + 1) >= base);
            }
        }
    }

    #[test]
    fn ceilings_are_non_decreasing() {
        for pair in RANKS.windows(2) {
            assert!(pair[0].max_topics <= pair[1].max_topics);
            assert!(pair[0].max_replies <= pair[1].max_replies);
        }
    }
}
