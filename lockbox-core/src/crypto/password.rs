//! Password generators for the "generate" affordance
//!
//! These use `rand::thread_rng` and are never a source of IVs, nonces or keys;
//! those come from `OsRng` in the cipher.

use crate::crypto::{CryptoError, Result};
use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "Brave", "Clever", "Swift", "Mighty", "Vibrant", "Gentle", "Fierce", "Calm", "Bright", "Wise",
    "Silent", "Cosmic", "Radiant", "Mystic", "Eternal", "Noble", "Vivid", "Serene", "Daring",
];

const NOUNS: &[&str] = &[
    "Tiger", "Mountain", "Ocean", "Eagle", "Phoenix", "Dragon", "River", "Forest", "Thunder",
    "Diamond", "Castle", "Warrior", "Galaxy", "Falcon", "Volcano", "Crystal", "Horizon", "Tempest",
    "Oasis",
];

const VERBS: &[&str] = &[
    "Jump", "Soar", "Dance", "Swim", "Climb", "Fly", "Run", "Dream", "Build", "Shine", "Explore",
    "Conquer", "Create", "Inspire", "Evolve", "Ignite", "Triumph", "Forge", "Transcend",
];

const WORD_SPECIALS: &[u8] = b"!@#$%^&*()_+-=";
const WORD_DIGITS: &[u8] = b"0123456789";

/// Generate a memorable password from random words, digits and symbols
///
/// The result always reaches the Strong band of the strength meter.
pub fn generate_memorable_password() -> String {
    generate_memorable_password_with(&mut rand::thread_rng())
}

/// [`generate_memorable_password`] with a caller-supplied RNG
pub fn generate_memorable_password_with<R: Rng>(rng: &mut R) -> String {
    let adjective = pick(rng, ADJECTIVES);
    let noun = pick(rng, NOUNS);
    let verb = pick(rng, VERBS);

    let special = [pick_char(rng, WORD_SPECIALS), pick_char(rng, WORD_SPECIALS)];
    let digits: String = [pick_char(rng, WORD_DIGITS), pick_char(rng, WORD_DIGITS)]
        .iter()
        .collect();

    let password = match rng.gen_range(0..3) {
        0 => format!("{}{}{}{}", adjective, special[0], noun, digits),
        1 => format!("{}{}{}{}", noun, digits, verb, special[1]),
        _ => format!("{}{}{}{}", special[0], verb, adjective, digits),
    };

    password
        .chars()
        .map(|c| match c {
            'a' => '@',
            'i' => '1',
            'e' => '3',
            'o' => '0',
            's' => '$',
            other => other,
        })
        .collect()
}

fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

fn pick_char<R: Rng>(rng: &mut R, set: &[u8]) -> char {
    set[rng.gen_range(0..set.len())] as char
}

/// Character sets for random password generation
struct CharacterSets;

impl CharacterSets {
    const LOWERCASE: &'static [u8] = b"abcdefghijklmnopqrstuvwxyz";
    const UPPERCASE: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    const DIGITS: &'static [u8] = b"0123456789";
    const SYMBOLS: &'static [u8] = b"!@#$%^&*()_+~`|}{[]:;?><,./-=";
    const AMBIGUOUS: &'static [u8] = b"l1IO0";
}

/// Configuration for random password generation
#[derive(Debug, Clone, Copy)]
pub struct PasswordGeneratorConfig {
    pub length: usize,
    pub include_lowercase: bool,
    pub include_uppercase: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
    /// Exclude ambiguous characters (l, 1, I, O, 0)
    pub exclude_ambiguous: bool,
}

impl Default for PasswordGeneratorConfig {
    fn default() -> Self {
        Self {
            length: 16,
            include_lowercase: true,
            include_uppercase: true,
            include_digits: true,
            include_symbols: true,
            exclude_ambiguous: true,
        }
    }
}

impl PasswordGeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_lowercase(mut self, include: bool) -> Self {
        self.include_lowercase = include;
        self
    }

    pub fn with_uppercase(mut self, include: bool) -> Self {
        self.include_uppercase = include;
        self
    }

    pub fn with_digits(mut self, include: bool) -> Self {
        self.include_digits = include;
        self
    }

    pub fn with_symbols(mut self, include: bool) -> Self {
        self.include_symbols = include;
        self
    }

    pub fn exclude_ambiguous(mut self, exclude: bool) -> Self {
        self.exclude_ambiguous = exclude;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.length < 4 {
            return Err(CryptoError::InvalidParameters(
                "Password length must be at least 4 characters".to_string(),
            ));
        }

        if !self.include_lowercase
            && !self.include_uppercase
            && !self.include_digits
            && !self.include_symbols
        {
            return Err(CryptoError::InvalidParameters(
                "At least one character type must be enabled".to_string(),
            ));
        }

        Ok(())
    }

    /// Character classes enabled by this config, ambiguous characters removed
    fn classes(&self) -> Vec<Vec<u8>> {
        let enabled = [
            (self.include_lowercase, CharacterSets::LOWERCASE),
            (self.include_uppercase, CharacterSets::UPPERCASE),
            (self.include_digits, CharacterSets::DIGITS),
            (self.include_symbols, CharacterSets::SYMBOLS),
        ];

        enabled
            .iter()
            .filter(|(include, _)| *include)
            .map(|(_, set)| {
                set.iter()
                    .copied()
                    .filter(|c| !(self.exclude_ambiguous && CharacterSets::AMBIGUOUS.contains(c)))
                    .collect()
            })
            .collect()
    }
}

/// Generate a random password from character classes
///
/// Contains at least one character of every enabled class.
pub fn generate_random_password(config: &PasswordGeneratorConfig) -> Result<String> {
    generate_random_password_with(config, &mut rand::thread_rng())
}

/// [`generate_random_password`] with a caller-supplied RNG
pub fn generate_random_password_with<R: Rng>(
    config: &PasswordGeneratorConfig,
    rng: &mut R,
) -> Result<String> {
    config.validate()?;

    let classes = config.classes();
    let pool: Vec<u8> = classes.iter().flatten().copied().collect();
    if pool.is_empty() {
        return Err(CryptoError::InvalidParameters(
            "Character pool is empty after applying filters".to_string(),
        ));
    }

    let mut password = Vec::with_capacity(config.length);

    // One from each requested class
    for class in &classes {
        if let Some(&c) = class.choose(rng) {
            password.push(c);
        }
    }

    while password.len() < config.length {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }

    password.shuffle(rng);

    Ok(password.into_iter().map(char::from).collect())
}
