//! Pronounceable display names.

use crate::frontend::NameSupplier;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

static CONSONANTS: &[char] = &[
    'b', 'c', 'd', 'f', 'g', 'h', 'j', 'k', 'l', 'm', 'n', 'p', 'r', 's', 't', 'v', 'w', 'z',
];
static VOWELS: &[char] = &['a', 'e', 'i', 'o', 'u'];

/// Alternates consonants and vowels, starting with either
#[derive(Debug, Clone, Copy, Default)]
pub struct SyllableNames;

impl NameSupplier for SyllableNames {
    fn make_name(&mut self, len: usize, rng: &mut ChaCha8Rng) -> String {
        let mut vowel_next = rng.gen_bool(0.5);
        let mut name = String::with_capacity(len);

        for i in 0..len {
            let pool = if vowel_next { VOWELS } else { CONSONANTS };
            let c = pool.choose(rng).copied().unwrap_or('a');
            if i == 0 {
                name.extend(c.to_uppercase());
            } else {
                name.push(c);
            }
            vowel_next = !vowel_next;
        }

        name
    }
}
