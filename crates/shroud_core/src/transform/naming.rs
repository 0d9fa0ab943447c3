//! Run-unique name allocation.
//!
//! [`NameAllocator`] belongs to one run and hands out placeholder names
//! (`__p_` followed by ten digits, resolved later by the renaming stage) and
//! final-form names under the configured [`NameMode`]. [`NameGenerator`] is an
//! independent sequence with its own counter, used where a transform needs a
//! private namespace such as frame slot keys.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{IdentifierGenerator, NameMode};

/// Prefix of placeholder names.
pub const PLACEHOLDER_PREFIX: &str = "__p_";

/// Names carrying this prefix are never virtualized or renamed.
pub const NO_RENAME_PREFIX: &str = "__keep_";

/// Words that may not be used as identifiers in ES5 and earlier.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "abstract", "arguments", "await", "boolean", "break", "byte", "case", "catch", "char",
    "class", "const", "continue", "debugger", "default", "delete", "do", "double", "else",
    "enum", "eval", "export", "extends", "false", "final", "finally", "float", "for",
    "function", "goto", "if", "implements", "import", "in", "instanceof", "int", "interface",
    "let", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "true", "try", "typeof", "var", "void", "volatile", "while", "with", "yield",
];

/// Identifiers that look like variables but are not.
pub const RESERVED_IDENTIFIERS: &[&str] =
    &["undefined", "null", "NaN", "Infinity", "eval", "arguments"];

/// Property names a frame slot must never use.
const UNSAFE_SLOT_KEYS: &[&str] = &["length", "__proto__", "constructor"];

const FIRST_CHARS: &[u8] = b"_ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const REST_CHARS: &[u8] = b"_ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const HEX_DIGITS: &[u8] = b"0123456789ABCDEF";

const ZERO_WIDTH_BASES: &[&str] = &[
    "if", "in", "for", "let", "new", "try", "var", "case", "else", "null", "break", "catch",
    "class", "const", "super", "throw", "while", "yield", "delete", "export", "import",
    "public", "return", "switch", "default", "finally", "private", "continue", "debugger",
    "function", "arguments", "protected", "instanceof", "await", "async",
];

/// `true` for reserved keywords and reserved identifiers.
pub fn is_reserved(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name) || RESERVED_IDENTIFIERS.contains(&name)
}

/// `true` for names produced by [`NameAllocator::placeholder`].
pub fn is_placeholder(name: &str) -> bool {
    name.starts_with(PLACEHOLDER_PREFIX)
}

/// The `n`-th name (1-based) of the sequence `a … z A … Z aa ab …`.
pub fn alphabetical(mut n: u64) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(ALPHABET[(n % 52) as usize]);
        n /= 52;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// One candidate name under `mode`; `count` is the caller's sequence number.
fn candidate<R: Rng + ?Sized>(rng: &mut R, mode: NameMode, count: u64) -> String {
    match mode {
        NameMode::Randomized => {
            let len = rng.gen_range(6..=8);
            let mut s = String::with_capacity(len);
            for i in 0..len {
                let set = if i == 0 { FIRST_CHARS } else { REST_CHARS };
                s.push(set[rng.gen_range(0..set.len())] as char);
            }
            s
        }
        NameMode::Hexadecimal => {
            let len = rng.gen_range(6..=8);
            let digits: String = (0..len)
                .map(|_| HEX_DIGITS[rng.gen_range(0..16)] as char)
                .collect();
            format!("_0x{digits}")
        }
        NameMode::Mangled => alphabetical(count),
        NameMode::Number => format!("var_{count}"),
        NameMode::ZeroWidth => {
            let base = ZERO_WIDTH_BASES.choose(rng).copied().unwrap_or("if");
            format!("{base}{}", "\u{200C}".repeat(count as usize + 1))
        }
    }
}

/// Final-form names must not read as keywords or carry an engine prefix.
fn acceptable(name: &str) -> bool {
    !name.is_empty()
        && !is_reserved(name)
        && !name.starts_with(PLACEHOLDER_PREFIX)
        && !name.starts_with(NO_RENAME_PREFIX)
}

/// The run's name allocator.
#[derive(Debug, Default)]
pub struct NameAllocator {
    generated: HashSet<String>,
    count: u64,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh placeholder name, unique for the run.
    pub fn placeholder<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        loop {
            let digits: String = (0..10)
                .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
                .collect();
            let name = format!("{PLACEHOLDER_PREFIX}{digits}");
            if self.generated.insert(name.clone()) {
                return name;
            }
        }
    }

    /// A fresh final-form name, unique for the run.
    pub fn identifier<R: Rng + ?Sized>(&mut self, rng: &mut R, generator: &IdentifierGenerator) -> String {
        loop {
            self.count += 1;
            let mode = generator.pick(rng);
            let name = candidate(rng, mode, self.count);
            if acceptable(&name) && self.generated.insert(name.clone()) {
                return name;
            }
        }
    }

    /// `true` if this allocator produced `name`.
    pub fn is_generated(&self, name: &str) -> bool {
        self.generated.contains(name)
    }

    /// Number of names handed out.
    pub fn len(&self) -> usize {
        self.generated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.is_empty()
    }
}

/// An independent name sequence with its own counter and uniqueness set.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    generator: IdentifierGenerator,
    count: u64,
    used: HashSet<String>,
}

impl NameGenerator {
    pub fn new(generator: IdentifierGenerator) -> Self {
        Self {
            generator,
            count: 0,
            used: HashSet::new(),
        }
    }

    /// The next name; never `length`, `__proto__` or `constructor`.
    pub fn generate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        loop {
            self.count += 1;
            let mode = self.generator.pick(rng);
            let name = candidate(rng, mode, self.count);
            if acceptable(&name)
                && !UNSAFE_SLOT_KEYS.contains(&name.as_str())
                && self.used.insert(name.clone())
            {
                return name;
            }
        }
    }
}
