//! Scoring, combos and experience-based levelling

/// Points per cleared piece before the combo bonus
pub const POINTS_PER_PIECE: u64 = 10;
/// Experience needed per level, multiplied by the current level
pub const DEFAULT_LEVEL_UP_EXP_BASE: u32 = 100;
/// Bonus fraction added per combo step
pub const DEFAULT_COMBO_BONUS_MULTIPLIER: f64 = 0.1;
/// Largest combo multiplier settings accept
pub const MAX_COMBO_BONUS_MULTIPLIER: f64 = 100.0;

/// Fixed-point scale for the combo multiplier
const BASIS_POINTS: u64 = 10_000;

/// Score, level and combo tracking for one session
#[derive(Debug, Clone)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starting at 1
    pub level: u32,
    /// Experience towards the next level
    pub experience: u32,
    /// Cascade passes so far in the current resolution (0 when idle)
    pub combo: u32,
    /// Combo multiplier in basis points (0.1 -> 1000)
    combo_bonus_bp: u64,
    level_up_exp_base: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new(DEFAULT_COMBO_BONUS_MULTIPLIER, DEFAULT_LEVEL_UP_EXP_BASE)
    }
}

impl Score {
    pub fn new(combo_bonus_multiplier: f64, level_up_exp_base: u32) -> Self {
        Self {
            points: 0,
            level: 1,
            experience: 0,
            combo: 0,
            combo_bonus_bp: (combo_bonus_multiplier.max(0.0) * BASIS_POINTS as f64).round() as u64,
            level_up_exp_base,
        }
    }

    /// Experience needed to leave `level`
    pub fn required_exp(&self, level: u32) -> u32 {
        self.level_up_exp_base.saturating_mul(level)
    }

    /// Points for clearing `cleared` pieces at the given combo step:
    /// `floor(10 * n * (1 + combo * multiplier))`
    pub fn points_for(&self, cleared: usize, combo: u32) -> u64 {
        let base = POINTS_PER_PIECE.saturating_mul(cleared as u64);
        let bonus = base
            .saturating_mul(combo as u64)
            .saturating_mul(self.combo_bonus_bp)
            / BASIS_POINTS;
        base.saturating_add(bonus)
    }

    /// Account for one cascade pass: bump the combo, award points and
    /// experience. Returns the points awarded.
    pub fn add_clear(&mut self, cleared: usize) -> u64 {
        self.combo += 1;
        let points = self.points_for(cleared, self.combo);
        self.points = self.points.saturating_add(points);
        self.experience = self.experience.saturating_add(cleared as u32);
        points
    }

    /// Apply every level-up the current experience pays for.
    /// Returns the levels reached, in order.
    pub fn check_level_up(&mut self) -> Vec<u32> {
        let mut reached = Vec::new();
        if self.level_up_exp_base == 0 {
            return reached;
        }
        while self.experience >= self.required_exp(self.level) {
            self.experience -= self.required_exp(self.level);
            self.level += 1;
            reached.push(self.level);
        }
        reached
    }

    /// Reset combo (called when a resolution settles)
    pub fn reset_combo(&mut self) {
        self.combo = 0;
    }

    /// Fraction of the way to the next level, 0.0..1.0
    pub fn level_progress(&self) -> f64 {
        match self.required_exp(self.level) {
            0 => 0.0,
            required => self.experience as f64 / required as f64,
        }
    }
}
