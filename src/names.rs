//! Human-readable names for generated kids and cartoons.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

const CARTOONS: &[&str] = &[
    "Peppa Pig", "Paw Patrol", "Bluey", "SpongeBob", "Tom and Jerry", "Scooby-Doo",
    "Ben 10", "Pokemon", "Miraculous", "Gumball", "Adventure Time", "Masha and the Bear",
    "Teen Titans Go", "Phineas and Ferb", "Looney Tunes", "Dora", "PJ Masks", "Octonauts",
    "Curious George", "Paddington", "Shaun the Sheep", "Fireman Sam", "Thomas and Friends",
    "Sofia the First", "Doc McStuffins", "Powerpuff Girls", "Dexter's Lab", "Arthur",
    "Franklin", "Caillou", "Pingu", "Moomins", "Heidi", "Maya the Bee", "Smurfs",
    "Tintin", "Asterix", "Lucky Luke", "Garfield", "Snoopy", "Winnie the Pooh", "Noddy",
];

pub struct NameGenerator {
    first_names: Vec<&'static str>,
    last_initials: Vec<char>,
    used_names: HashSet<String>,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        NameGenerator {
            first_names: vec![
                "Ana", "Luka", "Eva", "Jakob", "Mia", "Filip", "Zala", "Nik", "Lara", "Mark",
                "Sara", "Tim", "Ema", "Jan", "Nina", "Žan", "Lana", "Maks", "Ajda", "Vid",
            ],
            last_initials: ('A'..='Z').collect(),
            used_names: HashSet::new(),
        }
    }

    /// Draws `count` names not handed out before by this generator.
    pub fn generate_unique<R: Rng + ?Sized>(&mut self, rng: &mut R, count: usize) -> Result<Vec<String>> {
        let max_attempts = count.saturating_mul(50).max(100);
        let mut names = Vec::with_capacity(count);
        let mut attempts = 0;

        while names.len() < count {
            if attempts >= max_attempts {
                return Err(Error::NameSpaceExhausted {
                    requested: count,
                    attempts,
                });
            }
            attempts += 1;

            let (Some(first), Some(initial)) = (
                self.first_names.choose(rng),
                self.last_initials.choose(rng),
            ) else {
                break;
            };
            let name = format!("{first} {initial}.");
            if self.used_names.insert(name.clone()) {
                names.push(name);
            }
        }

        if names.len() < count {
            return Err(Error::NameSpaceExhausted {
                requested: count,
                attempts,
            });
        }
        Ok(names)
    }
}

/// Feature names for a universe of `universe_size` cartoons.
/// Titles repeat with a numeric suffix once the built-in list runs out.
pub fn cartoon_names(universe_size: usize) -> Vec<String> {
    (0..universe_size)
        .map(|i| {
            let title = CARTOONS[i % CARTOONS.len()];
            match i / CARTOONS.len() {
                0 => title.to_string(),
                round => format!("{title} {}", round + 1),
            }
        })
        .collect()
}
