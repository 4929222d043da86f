use crate::common::types::Split;
use std::collections::BTreeMap;

pub const TRAIN_FRACTION: f64 = 0.7;
pub const VAL_FRACTION: f64 = 0.1;

/// Owned 64-bit Xorshift PRNG scoped to one split assignment, so the
/// partition never touches (or perturbs) any process-wide random state.
/// Reproducible across platforms.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x853c_49e6_748f_ea9b } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

/// In-place Fisher-Yates shuffle driven by the owned PRNG.
fn shuffle<T>(items: &mut [T], rng: &mut Xorshift64) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_u64() as usize) % (i + 1);
        items.swap(i, j);
    }
}

/// Deterministically partition sequence identifiers into train/val/test.
///
/// Identifiers are sorted lexicographically before the seeded shuffle, so an
/// identical seed and identifier set yields the identical partition on every
/// run. The first 70% land in train, the next 10% in val (both
/// floor-rounded), the remainder in test.
pub fn assign_splits(ids: &[String], seed: u64) -> BTreeMap<String, Split> {
    let mut order: Vec<&String> = ids.iter().collect();
    order.sort();
    let mut rng = Xorshift64::new(seed);
    shuffle(&mut order, &mut rng);

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_train = (order.len() as f64 * TRAIN_FRACTION) as usize;
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let num_val = (order.len() as f64 * VAL_FRACTION) as usize;

    order
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let split = if i < num_train {
                Split::Train
            } else if i < num_train + num_val {
                Split::Val
            } else {
                Split::Test
            };
            (id.clone(), split)
        })
        .collect()
}
