use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::cards::Card;

/// Meld/deadwood breakdown of one hand, computed from the player's declared
/// visual ordering. Sent to clients in reveal payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandLayout {
    pub meld_groups: Vec<Vec<Card>>,
    pub deadwood: Vec<Card>,
    pub deadwood_points: u32,
    pub deadwood_count: usize,
}

/// 3 or 4 cards of one rank, all suits distinct.
fn is_valid_set(block: &[Card]) -> bool {
    if block.len() < 3 {
        return false;
    }
    let rank = block[0].rank;
    if !block.iter().all(|c| c.rank == rank) {
        return false;
    }
    let suits: HashSet<_> = block.iter().map(|c| c.suit).collect();
    suits.len() == block.len()
}

/// 3+ consecutive ranks of one suit, strictly ascending in the order the
/// player laid them out. Descending or shuffled runs do not count; the scan
/// never re-sorts.
fn is_valid_run(block: &[Card]) -> bool {
    if block.len() < 3 {
        return false;
    }
    let suit = block[0].suit;
    if !block.iter().all(|c| c.suit == suit) {
        return false;
    }
    block
        .windows(2)
        .all(|w| w[1].rank.order_value() == w[0].rank.order_value() + 1)
}

/// Greedy left-to-right meld scan over an already-ordered hand.
///
/// At each position the longest run starting there competes with a set
/// starting there (4-card tried before 3-card); a candidate only replaces
/// the current best when strictly longer, so runs win length ties. The scan
/// then jumps past the consumed block, or one card if nothing melds.
///
/// Deliberately a single-pass heuristic mirroring a hand arranged
/// left-to-right, not an optimal deadwood partition. Client and server run
/// the same rule, so the two always agree on the grouping.
pub fn detect_meld_groups(cards_in_order: &[Card]) -> Vec<Vec<Card>> {
    let mut groups = Vec::new();
    let mut i = 0;

    while i < cards_in_order.len() {
        let mut best: Option<&[Card]> = None;

        // Longest run starting at i.
        for j in (i + 2)..cards_in_order.len() {
            let slice = &cards_in_order[i..=j];
            if is_valid_run(slice) && best.map_or(true, |b| slice.len() > b.len()) {
                best = Some(slice);
            }
        }

        // Set starting at i (prefer 4 over 3).
        for len in [4usize, 3] {
            if i + len > cards_in_order.len() {
                continue;
            }
            let slice = &cards_in_order[i..i + len];
            if is_valid_set(slice) && best.map_or(true, |b| slice.len() > b.len()) {
                best = Some(slice);
            }
        }

        match best {
            Some(block) => {
                i += block.len();
                groups.push(block.to_vec());
            }
            None => i += 1,
        }
    }

    groups
}

/// Reconstructs the player's visual ordering from the declared card ids and
/// evaluates melds/deadwood over it.
///
/// The declared ids are untrusted advisory input: each is resolved against
/// the actual hand by map lookup (unknown ids dropped), and hand cards the
/// client never mentioned are appended after the declared block. An empty
/// declaration means the whole hand is deadwood; the server never guesses
/// an ordering.
pub fn layout_from_order(hand: &[Card], order_ids: &[String]) -> HandLayout {
    if order_ids.is_empty() {
        let deadwood_points = hand.iter().map(Card::deadwood_value).sum();
        return HandLayout {
            meld_groups: Vec::new(),
            deadwood: hand.to_vec(),
            deadwood_points,
            deadwood_count: hand.len(),
        };
    }

    let by_id: HashMap<String, Card> = hand.iter().map(|c| (c.id(), *c)).collect();

    let ordered: Vec<Card> = order_ids.iter().filter_map(|id| by_id.get(id).copied()).collect();
    let seen: HashSet<String> = ordered.iter().map(Card::id).collect();
    let missing = hand.iter().filter(|c| !seen.contains(&c.id())).copied();
    let ordered_full: Vec<Card> = ordered.into_iter().chain(missing).collect();

    let meld_groups = detect_meld_groups(&ordered_full);
    let meld_ids: HashSet<String> = meld_groups
        .iter()
        .flat_map(|group| group.iter().map(Card::id))
        .collect();

    let deadwood: Vec<Card> = ordered_full
        .iter()
        .filter(|c| !meld_ids.contains(&c.id()))
        .copied()
        .collect();
    let deadwood_points = deadwood.iter().map(Card::deadwood_value).sum();
    let deadwood_count = deadwood.len();

    HandLayout {
        meld_groups,
        deadwood,
        deadwood_points,
        deadwood_count,
    }
}
