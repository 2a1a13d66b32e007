// ═══════════════════════════════════════════════════════════════
//  Rng (xorshift64)
// ═══════════════════════════════════════════════════════════════

struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: i64) -> Self {
        let state = if seed == 0 {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos() as u64
                | 1 // ensure non-zero
        } else {
            seed as u64
        };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    fn next_intn(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

// ═══════════════════════════════════════════════════════════════
//  NameGenerator
// ═══════════════════════════════════════════════════════════════

const ADJECTIVES: &[&str] = &[
    "admiring", "bold", "brave", "calm", "clever", "eager", "fervent", "gifted",
    "jolly", "keen", "lucid", "patient", "quirky", "sharp", "vigilant", "zealous",
];

const NOUNS: &[&str] = &[
    "bohr", "curie", "darwin", "euler", "fermi", "galileo", "hopper", "kepler",
    "lovelace", "meitner", "newton", "noether", "pasteur", "ramanujan", "tesla",
    "turing",
];

/// Детерминированный генератор client id вида `adjective_noun`.
///
/// Один и тот же ненулевой seed даёт одну и ту же последовательность
/// имён; seed 0 — от текущего времени. Используется только для
/// тегирования сессии.
pub struct NameGenerator {
    rng: Rng,
}

impl NameGenerator {
    pub fn new(seed: i64) -> Self {
        Self { rng: Rng::new(seed) }
    }

    pub fn generate(&mut self) -> String {
        let adjective = ADJECTIVES[self.rng.next_intn(ADJECTIVES.len())];
        let noun = NOUNS[self.rng.next_intn(NOUNS.len())];
        format!("{adjective}_{noun}")
    }
}
