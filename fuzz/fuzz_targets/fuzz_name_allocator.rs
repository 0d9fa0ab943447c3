#![no_main]

use std::collections::{BTreeMap, HashSet};

use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shroud_core::config::{IdentifierGenerator, NameMode};
use shroud_core::transform::naming::{NameAllocator, NameGenerator, PLACEHOLDER_PREFIX, is_reserved};

// Drive the allocator and an independent generator with fuzzer-chosen
// modes and check that every name is unique, never reserved, and that
// placeholders keep their fixed shape.
//
// Each byte is one request:
//   bits [1:0] – 0 = placeholder, 1 = identifier, 2/3 = generator name
//   bits [4:2] – naming mode (0–4, larger values select a weighted mix)
const MODES: [NameMode; 5] = [
    NameMode::Randomized,
    NameMode::Hexadecimal,
    NameMode::Mangled,
    NameMode::Number,
    NameMode::ZeroWidth,
];
const MAX_REQUESTS: usize = 512;

fn generator(sel: u8) -> IdentifierGenerator {
    match MODES.get(usize::from(sel)) {
        Some(&mode) => IdentifierGenerator::Mode(mode),
        None => IdentifierGenerator::Weighted(BTreeMap::from([
            (NameMode::Mangled, 1.0),
            (NameMode::Hexadecimal, 2.0),
        ])),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut rng = StdRng::seed_from_u64(data.len() as u64);
    let mut allocator = NameAllocator::new();
    let mut slots = NameGenerator::new(IdentifierGenerator::Mode(NameMode::Mangled));
    let mut seen_slots = HashSet::new();

    for &byte in data.iter().take(MAX_REQUESTS) {
        let mode = generator((byte >> 2) & 0x7);
        match byte & 0x3 {
            0 => {
                let name = allocator.placeholder(&mut rng);
                let digits = name.strip_prefix(PLACEHOLDER_PREFIX).expect("placeholder prefix");
                assert_eq!(digits.len(), 10);
                assert!(digits.bytes().all(|b| b.is_ascii_digit()));
            }
            1 => {
                let before = allocator.len();
                let name = allocator.identifier(&mut rng, &mode);
                assert!(!is_reserved(&name), "reserved name {name}");
                assert_eq!(allocator.len(), before + 1, "duplicate name {name}");
            }
            _ => {
                let name = slots.generate(&mut rng);
                assert!(!is_reserved(&name));
                assert!(name != "length" && name != "__proto__" && name != "constructor");
                assert!(seen_slots.insert(name));
            }
        }
    }
});
