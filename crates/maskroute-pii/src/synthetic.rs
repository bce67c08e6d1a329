//! Synthetic replacement values
//!
//! Replacements are format-compatible with the PII they stand in for, so a
//! downstream model sees plausible data. Email domains come from the reserved
//! `example.*` space and card numbers pass the Luhn check.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

/// Generator callback reported by a matcher for one category
pub type GenerateFn = fn(&mut dyn SyntheticGenerator) -> String;

/// Source of fabricated, realistic-looking PII values
pub trait SyntheticGenerator: Send {
    fn email(&mut self) -> String;

    fn credit_card_number(&mut self) -> String;

    fn phone_number(&mut self) -> String;

    /// Full person name
    fn name(&mut self) -> String;

    fn company(&mut self) -> String;
}

pub(crate) fn generate_email(generator: &mut dyn SyntheticGenerator) -> String {
    generator.email()
}

pub(crate) fn generate_credit_card(generator: &mut dyn SyntheticGenerator) -> String {
    generator.credit_card_number()
}

pub(crate) fn generate_phone_number(generator: &mut dyn SyntheticGenerator) -> String {
    generator.phone_number()
}

pub(crate) fn generate_name(generator: &mut dyn SyntheticGenerator) -> String {
    generator.name()
}

pub(crate) fn generate_company(generator: &mut dyn SyntheticGenerator) -> String {
    generator.company()
}

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Abigail", "Adrian", "Alicia", "Bernard", "Bianca", "Caleb", "Camila", "Dalia",
    "Dorian", "Eliza", "Emmett", "Felix", "Fiona", "Gideon", "Greta", "Hazel", "Hugo", "Imogen",
    "Ivan", "Jasper", "Juniper", "Kieran", "Lena", "Lucian", "Mabel", "Milo", "Nadia", "Otto",
    "Priya", "Quentin", "Rosalind", "Silas", "Tamsin", "Ulric", "Vera", "Wendell", "Yara",
    "Zane",
];

const LAST_NAMES: &[&str] = &[
    "Abernathy", "Bellweather", "Castellano", "Dunmore", "Everly", "Fairbanks", "Galloway",
    "Hargreave", "Ingram", "Jessup", "Kowalczyk", "Lindqvist", "Marchetti", "Northcott",
    "Okonkwo", "Pemberton", "Quimby", "Rasmussen", "Sandoval", "Thistlewood", "Underhill",
    "Valdivia", "Whitlock", "Yarborough", "Zeller",
];

const COMPANY_SUFFIXES: &[&str] = &["Inc", "LLC", "Group", "Ltd", "PLC", "and Sons", "Partners"];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

/// Default generator backed by a seedable RNG
pub struct FakeDataGenerator {
    rng: StdRng,
}

impl FakeDataGenerator {
    /// Create a generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, values: &'static [&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }

    fn digits(&mut self, count: usize) -> String {
        (0..count)
            .map(|_| char::from(b'0' + self.rng.random_range(0..10u8)))
            .collect()
    }

    /// North American style group that never starts with 0 or 1
    fn area_code(&mut self) -> String {
        format!("{}{}", self.rng.random_range(2..10u8), self.digits(2))
    }
}

impl Default for FakeDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticGenerator for FakeDataGenerator {
    fn email(&mut self) -> String {
        let first = self.pick(FIRST_NAMES).to_lowercase();
        let last = self.pick(LAST_NAMES).to_lowercase();
        let domain = self.pick(EMAIL_DOMAINS);

        match self.rng.random_range(0..3u8) {
            0 => format!("{}.{}@{}", first, last, domain),
            1 => format!("{}{}@{}", &first[..1], last, domain),
            _ => format!("{}{}@{}", first, self.rng.random_range(10..100u8), domain),
        }
    }

    fn credit_card_number(&mut self) -> String {
        // (issuer prefix, total length)
        const ISSUERS: &[(&str, usize)] = &[
            ("4", 16),
            ("51", 16),
            ("53", 16),
            ("55", 16),
            ("37", 15),
            ("6011", 16),
        ];

        let (prefix, length) = ISSUERS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(("4", 16));

        let mut number = String::with_capacity(length);
        number.push_str(prefix);
        number.push_str(&self.digits(length - prefix.len() - 1));
        let check = luhn_check_digit(&number);
        number.push(char::from(b'0' + check));
        number
    }

    fn phone_number(&mut self) -> String {
        let area = self.area_code();
        let exchange = self.area_code();
        let line = self.digits(4);

        match self.rng.random_range(0..4u8) {
            0 => format!("+1-{}-{}-{}", area, exchange, line),
            1 => format!("({}) {}-{}", area, exchange, line),
            2 => format!("{}.{}.{}", area, exchange, line),
            _ => format!("+1 {} {} {}", area, exchange, line),
        }
    }

    fn name(&mut self) -> String {
        format!("{} {}", self.pick(FIRST_NAMES), self.pick(LAST_NAMES))
    }

    fn company(&mut self) -> String {
        match self.rng.random_range(0..3u8) {
            0 => format!("{} {}", self.pick(LAST_NAMES), self.pick(COMPANY_SUFFIXES)),
            1 => format!("{}-{}", self.pick(LAST_NAMES), self.pick(LAST_NAMES)),
            _ => format!(
                "{}, {} and {}",
                self.pick(LAST_NAMES),
                self.pick(LAST_NAMES),
                self.pick(LAST_NAMES)
            ),
        }
    }
}

/// Check digit that makes `payload` followed by it pass the Luhn algorithm
fn luhn_check_digit(payload: &str) -> u8 {
    let sum: u32 = payload
        .chars()
        .filter_map(|c| c.to_digit(10))
        .rev()
        .enumerate()
        .map(|(i, d)| {
            // The check digit will sit at index 0, so payload digits at even
            // indices from the right are the doubled ones.
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

/// Validate a card number using the Luhn algorithm
pub fn luhn_valid(number: &str) -> bool {
    let digits: Vec<u32> = number.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() < 13 || digits.len() > 19 {
        return false;
    }

    let checksum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    checksum.is_multiple_of(10)
}
