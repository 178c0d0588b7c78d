use crate::core::entities::Move;
use rand::Rng;
use std::collections::BTreeMap;

/// A participant's proposal for the next move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub player: String,
    pub proposal: Move,
}

/// Pending votes of one game, at most one per participant.
///
/// Votes are kept ordered by participant so that picking a winner depends
/// only on who voted and on the random source, not on arrival order.
#[derive(Debug, Clone, Default)]
pub struct VotePool {
    votes: BTreeMap<String, Move>,
}

impl VotePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a vote, replacing any earlier one from the same participant.
    /// Returns the vote it replaced.
    pub fn record(&mut self, player: &str, proposal: Move) -> Option<Move> {
        self.votes.insert(player.to_string(), proposal)
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn get(&self, player: &str) -> Option<&Move> {
        self.votes.get(player)
    }

    /// Takes every pending vote out of the pool in participant order.
    pub fn drain(&mut self) -> Vec<Vote> {
        std::mem::take(&mut self.votes)
            .into_iter()
            .map(|(player, proposal)| Vote { player, proposal })
            .collect()
    }
}

/// Picks one of `votes` uniformly at random.
pub fn pick_vote<R: Rng + ?Sized>(votes: &[Vote], rng: &mut R) -> Option<Vote> {
    if votes.is_empty() {
        return None;
    }
    let roll = rng.gen_range(0..votes.len());
    Some(votes[roll].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entities::Coords;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn later_vote_replaces_earlier_one() {
        let mut pool = VotePool::new();

        assert_eq!(None, pool.record("foo", Move::Pass));
        assert_eq!(
            Some(Move::Pass),
            pool.record("foo", Move::Place(Coords::from(3, 3)))
        );

        assert_eq!(1, pool.len());
        assert_eq!(Some(&Move::Place(Coords::from(3, 3))), pool.get("foo"));
    }

    #[test]
    fn drain_empties_pool_in_player_order() {
        let mut pool = VotePool::new();
        pool.record("zed", Move::Pass);
        pool.record("amy", Move::Place(Coords::from(0, 0)));
        pool.record("kim", Move::Pass);

        let votes = pool.drain();

        let players: Vec<&str> = votes.iter().map(|v| v.player.as_str()).collect();
        assert_eq!(vec!["amy", "kim", "zed"], players);
        assert!(pool.is_empty());
        assert!(pool.drain().is_empty());
    }

    #[test]
    fn picking_from_nothing_gives_nothing() {
        let mut rng = StdRng::seed_from_u64(42);

        assert_eq!(None, pick_vote(&[], &mut rng));
    }

    #[test]
    fn same_seed_and_voters_pick_same_vote() {
        let fill = |order: &[&str]| {
            let mut pool = VotePool::new();
            for (i, player) in order.iter().enumerate() {
                pool.record(player, Move::Place(Coords::from(i as i32, 0)));
            }
            pool
        };
        // arrival order differs but every player proposes the same thing
        let mut first = fill(&["a", "b", "c", "d"]);
        let mut second = VotePool::new();
        for player in ["d", "c", "b", "a"].iter() {
            second.record(player, *first.get(player).unwrap());
        }

        let a = pick_vote(&first.drain(), &mut StdRng::seed_from_u64(42));
        let b = pick_vote(&second.drain(), &mut StdRng::seed_from_u64(42));

        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
