use rand::Rng;

use crate::difficulty::DrillDifficulty;
use crate::scoring;

/// A key press as seen by the drill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillKey {
    /// A printable key
    Char(char),
    /// Enter, Backspace, arrows and the like; counts as a miss
    Other,
    /// Shift, Control, Alt, Meta, CapsLock, Tab, Escape; never counted
    Modifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillOutcome {
    Hit,
    Miss,
    Ignored,
}

/// Draw a key from `pool`, re-drawing until it differs from `previous`.
/// A single-key pool skips the re-draw, otherwise it would never terminate.
pub fn draw_key<R: Rng + ?Sized>(pool: &[char], previous: Option<char>, rng: &mut R) -> char {
    if pool.is_empty() {
        return ' ';
    }
    let mut key = pool[rng.gen_range(0..pool.len())];
    while Some(key) == previous && pool.len() > 1 {
        key = pool[rng.gen_range(0..pool.len())];
    }
    key
}

/// Score state of a single-key drill round
#[derive(Debug, Clone)]
pub struct DrillRound {
    difficulty: DrillDifficulty,
    pool: Vec<char>,
    target: char,
    score: u32,
    total: u32,
    combo: u32,
    best_combo: u32,
}

impl DrillRound {
    pub fn new<R: Rng + ?Sized>(difficulty: DrillDifficulty, rng: &mut R) -> Self {
        Self::with_pool(difficulty, difficulty.pool(), rng)
    }

    pub fn with_pool<R: Rng + ?Sized>(difficulty: DrillDifficulty, pool: Vec<char>, rng: &mut R) -> Self {
        let target = draw_key(&pool, None, rng);
        Self {
            difficulty,
            pool,
            target,
            score: 0,
            total: 0,
            combo: 0,
            best_combo: 0,
        }
    }

    pub fn difficulty(&self) -> DrillDifficulty {
        self.difficulty
    }

    pub fn target(&self) -> char {
        self.target
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn best_combo(&self) -> u32 {
        self.best_combo
    }

    /// True once the round has anything worth recording
    pub fn has_activity(&self) -> bool {
        self.score > 0 || self.total > 0
    }

    pub fn press<R: Rng + ?Sized>(&mut self, key: DrillKey, rng: &mut R) -> DrillOutcome {
        let c = match key {
            DrillKey::Modifier => return DrillOutcome::Ignored,
            DrillKey::Other => None,
            DrillKey::Char(c) => Some(c),
        };

        self.total += 1;

        let hit = c.is_some_and(|c| c.to_lowercase().eq(self.target.to_lowercase()));
        if hit {
            self.score += 1;
            self.combo += 1;
            self.best_combo = self.best_combo.max(self.combo);
            self.target = draw_key(&self.pool, Some(self.target), rng);
            DrillOutcome::Hit
        } else {
            self.combo = 0;
            DrillOutcome::Miss
        }
    }

    /// Accuracy for display: 100 before the first press
    pub fn accuracy(&self) -> u32 {
        scoring::hit_rate(self.score, self.total).unwrap_or(100)
    }

    /// Accuracy for the history record: 0 before the first press
    pub fn recorded_accuracy(&self) -> u32 {
        scoring::hit_rate(self.score, self.total).unwrap_or(0)
    }

    pub fn cpm(&self, elapsed_secs: u64) -> u32 {
        scoring::cpm(self.score, elapsed_secs as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_draw_never_repeats_previous() {
        let mut rng = rng();
        let pool: Vec<char> = "asdfghjkl".chars().collect();
        let mut previous = draw_key(&pool, None, &mut rng);

        for _ in 0..1000 {
            let next = draw_key(&pool, Some(previous), &mut rng);
            assert_ne!(next, previous);
            assert!(pool.contains(&next));
            previous = next;
        }
    }

    #[test]
    fn test_draw_two_key_pool_alternates() {
        let mut rng = rng();
        let pool = vec!['a', 'b'];
        let mut previous = 'a';
        for _ in 0..50 {
            let next = draw_key(&pool, Some(previous), &mut rng);
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_draw_single_key_pool_terminates() {
        let mut rng = rng();
        assert_eq!(draw_key(&['x'], Some('x'), &mut rng), 'x');
    }

    #[test]
    fn test_hit_advances_target() {
        let mut rng = rng();
        let mut round = DrillRound::new(DrillDifficulty::HomeRow, &mut rng);
        let first = round.target();

        assert_eq!(round.press(DrillKey::Char(first), &mut rng), DrillOutcome::Hit);

        assert_eq!(round.score(), 1);
        assert_eq!(round.total(), 1);
        assert_eq!(round.combo(), 1);
        assert_ne!(round.target(), first);
    }

    #[test]
    fn test_hit_is_case_insensitive() {
        let mut rng = rng();
        let mut round = DrillRound::new(DrillDifficulty::Alpha, &mut rng);
        let upper = round.target().to_ascii_uppercase();

        assert_eq!(round.press(DrillKey::Char(upper), &mut rng), DrillOutcome::Hit);
    }

    #[test]
    fn test_miss_resets_combo() {
        let mut rng = rng();
        let mut round = DrillRound::new(DrillDifficulty::Numbers, &mut rng);
        round.press(DrillKey::Char(round.target()), &mut rng);
        round.press(DrillKey::Char(round.target()), &mut rng);
        assert_eq!(round.combo(), 2);

        assert_eq!(round.press(DrillKey::Char('z'), &mut rng), DrillOutcome::Miss);
        assert_eq!(round.combo(), 0);
        assert_eq!(round.best_combo(), 2);
        assert_eq!(round.score(), 2);
        assert_eq!(round.total(), 3);
        assert_eq!(round.accuracy(), 67);
    }

    #[test]
    fn test_modifiers_are_not_counted() {
        let mut rng = rng();
        let mut round = DrillRound::new(DrillDifficulty::HomeRow, &mut rng);

        assert_eq!(round.press(DrillKey::Modifier, &mut rng), DrillOutcome::Ignored);
        assert_eq!(round.total(), 0);
        assert!(!round.has_activity());

        assert_eq!(round.press(DrillKey::Other, &mut rng), DrillOutcome::Miss);
        assert_eq!(round.total(), 1);
        assert!(round.has_activity());
    }

    #[test]
    fn test_accuracy_before_first_press() {
        let mut rng = rng();
        let round = DrillRound::new(DrillDifficulty::HomeRow, &mut rng);
        assert_eq!(round.accuracy(), 100);
        assert_eq!(round.recorded_accuracy(), 0);
        assert_eq!(round.cpm(0), 0);
    }

    #[test]
    fn test_ten_hits_in_five_seconds() {
        let mut rng = rng();
        let mut round = DrillRound::new(DrillDifficulty::HomeRow, &mut rng);
        for _ in 0..10 {
            round.press(DrillKey::Char(round.target()), &mut rng);
        }
        assert_eq!(round.score(), 10);
        assert_eq!(round.cpm(5), 120);
    }
}
