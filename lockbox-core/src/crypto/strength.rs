//! Password strength analysis
//!
//! One set of signals feeds two scales: the 0-100 meter shown while typing
//! (Weak / Moderate / Strong) and the 0-4 score used for vault health. The
//! 0-4 score is derived from the meter so the two can never disagree.

use serde::Serialize;

/// Substrings that mark a password as following a common pattern
const COMMON_PATTERNS: &[&str] = &["password", "admin", "welcome", "qwerty", "abc", "123"];

const LONG_LENGTH: usize = 12;
const MIN_LENGTH: usize = 8;

const LONG_BONUS: u8 = 25;
const MIN_LENGTH_BONUS: u8 = 15;
const UPPERCASE_BONUS: u8 = 15;
const LOWERCASE_BONUS: u8 = 15;
const DIGIT_BONUS: u8 = 15;
const SYMBOL_BONUS: u8 = 20;
// Never larger than the smallest class bonus, so completing a common word by
// adding a missing class cannot lower the score.
const COMMON_PATTERN_PENALTY: u8 = 15;

/// Lowest 0-4 score that is not considered weak
pub const STRONG_SCORE: u8 = 3;

/// Label shown next to the strength meter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MeterLabel {
    Weak,
    Moderate,
    Strong,
}

impl MeterLabel {
    /// Classify a 0-100 meter value
    pub fn from_meter(meter: u8) -> Self {
        if meter < 40 {
            MeterLabel::Weak
        } else if meter < 70 {
            MeterLabel::Moderate
        } else {
            MeterLabel::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeterLabel::Weak => "Weak",
            MeterLabel::Moderate => "Moderate",
            MeterLabel::Strong => "Strong",
        }
    }

    /// Get the color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            MeterLabel::Weak => "\x1b[31m",     // Red
            MeterLabel::Moderate => "\x1b[33m", // Yellow
            MeterLabel::Strong => "\x1b[32m",   // Green
        }
    }
}

/// Strength rating on the 0-4 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum PasswordStrength {
    VeryWeak = 0,
    Weak = 1,
    Fair = 2,
    Good = 3,
    Strong = 4,
}

/// Lower meter bound of each rating, strongest first
const RATING_THRESHOLDS: [(u8, PasswordStrength); 4] = [
    (85, PasswordStrength::Strong),
    (70, PasswordStrength::Good),
    (40, PasswordStrength::Fair),
    (20, PasswordStrength::Weak),
];

impl PasswordStrength {
    /// Map a 0-100 meter value onto the 0-4 scale
    pub fn from_meter(meter: u8) -> Self {
        RATING_THRESHOLDS
            .iter()
            .find(|(floor, _)| meter >= *floor)
            .map_or(PasswordStrength::VeryWeak, |(_, rating)| *rating)
    }

    /// Numeric score, 0 (weakest) to 4
    pub fn score(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PasswordStrength::VeryWeak => "Very Weak",
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Fair => "Fair",
            PasswordStrength::Good => "Good",
            PasswordStrength::Strong => "Strong",
        }
    }
}

/// Score plus ordered remediation hints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthAssessment {
    /// 0 (weakest) to 4 (strongest)
    pub score: u8,
    pub suggestions: Vec<String>,
}

impl StrengthAssessment {
    pub fn is_weak(&self) -> bool {
        self.score < STRONG_SCORE
    }
}

/// Full password analysis result
#[derive(Debug, Clone, Serialize)]
pub struct PasswordAnalysis {
    /// Rating on the 0-4 scale
    pub strength: PasswordStrength,
    /// Meter value, 0-100
    pub meter: u8,
    pub label: MeterLabel,
    pub entropy_bits: f64,
    /// Brute-force estimate at [`GUESSES_PER_SECOND`]
    pub crack_time_seconds: f64,
    /// Length in characters, not bytes
    pub length: usize,
    pub has_lowercase: bool,
    pub has_uppercase: bool,
    pub has_digits: bool,
    pub has_symbols: bool,
    pub has_common_pattern: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Offline attacker speed used for crack time estimates
pub const GUESSES_PER_SECOND: f64 = 1e10;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const YEAR: f64 = 365.0 * DAY;

/// Upper bound and unit size for each crack time rendering
const TIME_UNITS: [(f64, f64, &str); 6] = [
    (MINUTE, 1.0, "seconds"),
    (HOUR, MINUTE, "minutes"),
    (DAY, HOUR, "hours"),
    (YEAR, DAY, "days"),
    (10.0 * YEAR, YEAR, "years"),
    (100.0 * YEAR, 10.0 * YEAR, "decades"),
];

impl PasswordAnalysis {
    /// 0-4 score
    pub fn score(&self) -> u8 {
        self.strength.score()
    }

    pub fn assessment(&self) -> StrengthAssessment {
        StrengthAssessment {
            score: self.score(),
            suggestions: self.suggestions.clone(),
        }
    }

    /// Crack time rounded down to the largest fitting unit
    pub fn crack_time_human(&self) -> String {
        let seconds = self.crack_time_seconds;
        if seconds < 1.0 {
            return "Instantly".to_string();
        }

        TIME_UNITS
            .iter()
            .find(|(limit, _, _)| seconds < *limit)
            .map(|(_, unit, name)| format!("{} {}", (seconds / unit).floor(), name))
            .unwrap_or_else(|| "Centuries".to_string())
    }
}

/// Score a password on the 0-4 scale with suggestions
pub fn score(password: &str) -> StrengthAssessment {
    analyze_password(password).assessment()
}

/// Score a password on the 0-100 meter scale
pub fn meter_score(password: &str) -> u8 {
    analyze_password(password).meter
}

/// Character classes present in a password
#[derive(Debug, Clone, Copy, Default)]
struct CharClasses {
    lower: bool,
    upper: bool,
    digit: bool,
    symbol: bool,
}

impl CharClasses {
    fn of(chars: &[char]) -> Self {
        chars.iter().fold(Self::default(), |mut classes, c| {
            if c.is_ascii_lowercase() {
                classes.lower = true;
            } else if c.is_ascii_uppercase() {
                classes.upper = true;
            } else if c.is_ascii_digit() {
                classes.digit = true;
            } else {
                classes.symbol = true;
            }
            classes
        })
    }

    /// Alphabet size an attacker would have to search
    fn alphabet_size(&self) -> u32 {
        [
            (self.lower, 26u32),
            (self.upper, 26),
            (self.digit, 10),
            (self.symbol, 32),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, size)| *size)
        .sum()
    }

    fn bonus(&self) -> i32 {
        [
            (self.upper, UPPERCASE_BONUS),
            (self.lower, LOWERCASE_BONUS),
            (self.digit, DIGIT_BONUS),
            (self.symbol, SYMBOL_BONUS),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .map(|(_, bonus)| i32::from(*bonus))
        .sum()
    }
}

fn length_bonus(length: usize) -> i32 {
    if length >= LONG_LENGTH {
        i32::from(LONG_BONUS)
    } else if length >= MIN_LENGTH {
        i32::from(MIN_LENGTH_BONUS)
    } else {
        0
    }
}

fn has_run_of_three(chars: &[char]) -> bool {
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// Three consecutive code points going up or down, like `abc` or `321`
fn has_sequence_of_three(chars: &[char]) -> bool {
    chars.windows(3).any(|w| {
        let (a, b, c) = (w[0] as i64, w[1] as i64, w[2] as i64);
        let step = b - a;
        step.abs() == 1 && c - b == step
    })
}

/// Analyze password strength
///
/// Pure function of its input; the empty string scores 0 with every
/// suggestion present.
pub fn analyze_password(password: &str) -> PasswordAnalysis {
    let chars: Vec<char> = password.chars().collect();
    let length = chars.len();
    let classes = CharClasses::of(&chars);

    let lowered = password.to_lowercase();
    let has_common_pattern = COMMON_PATTERNS.iter().any(|p| lowered.contains(p));

    let penalty = if has_common_pattern {
        i32::from(COMMON_PATTERN_PENALTY)
    } else {
        0
    };
    let meter = (length_bonus(length) + classes.bonus() - penalty).clamp(0, 100) as u8;

    let alphabet = classes.alphabet_size();
    let entropy_bits = if alphabet == 0 {
        0.0
    } else {
        length as f64 * f64::from(alphabet).log2()
    };
    let crack_time_seconds = if entropy_bits > 0.0 {
        entropy_bits.exp2() / GUESSES_PER_SECOND
    } else {
        0.0
    };

    let length_hint = if length < MIN_LENGTH {
        Some(("Password is too short", "Use at least 8 characters"))
    } else if length < LONG_LENGTH {
        Some((
            "Password could be longer",
            "Consider using 12+ characters for better security",
        ))
    } else {
        None
    };

    // Order here is the order users see
    let checks = [
        (
            !classes.upper,
            "No uppercase letters",
            "Add uppercase letters (A-Z)",
        ),
        (
            !classes.lower,
            "No lowercase letters",
            "Add lowercase letters (a-z)",
        ),
        (!classes.digit, "No numbers", "Add numbers (0-9)"),
        (
            !classes.symbol,
            "No special characters",
            "Add special characters (!@#$%, etc.)",
        ),
        (
            has_common_pattern,
            "Contains a common word or pattern",
            "Avoid common words and patterns like 'password' or '123'",
        ),
        (
            has_run_of_three(&chars),
            "Contains repeating characters",
            "Avoid repeating characters",
        ),
        (
            has_sequence_of_three(&chars),
            "Contains sequential characters",
            "Avoid sequential patterns",
        ),
    ];

    let (warnings, suggestions): (Vec<String>, Vec<String>) = length_hint
        .into_iter()
        .chain(
            checks
                .iter()
                .filter(|(unmet, _, _)| *unmet)
                .map(|(_, warning, suggestion)| (*warning, *suggestion)),
        )
        .map(|(warning, suggestion)| (warning.to_string(), suggestion.to_string()))
        .unzip();

    PasswordAnalysis {
        strength: PasswordStrength::from_meter(meter),
        meter,
        label: MeterLabel::from_meter(meter),
        entropy_bits,
        crack_time_seconds,
        length,
        has_lowercase: classes.lower,
        has_uppercase: classes.upper,
        has_digits: classes.digit,
        has_symbols: classes.symbol,
        has_common_pattern,
        warnings,
        suggestions,
    }
}
