//! Deterministic identifier generation.
//!
//! Two disjoint 13-letter windows: `A..M` for output generic parameters and
//! `N..Z` for input generic parameters. Past the window the letter repeats,
//! so index 13 is `AA` (or `NN`), index 26 is `AAA`, and so on.

const WINDOW: usize = 13;

pub const OUTPUT_OFFSET: usize = 0;
pub const INPUT_OFFSET: usize = 13;

/// `""` when `n == 0`, otherwise `label` followed by the decimal digits of `n`.
pub fn append_non_zero(label: &str, n: usize) -> String {
    if n == 0 { String::new() } else { format!("{label}{n}") }
}

pub fn parameter_string(offset: usize, n: usize) -> String {
    let letter = char::from(b'A' + (offset + n % WINDOW) as u8);
    let repeat = n / WINDOW + 1;
    std::iter::repeat_n(letter, repeat).collect()
}

pub fn input_letter(n: usize) -> String {
    parameter_string(INPUT_OFFSET, n)
}

pub fn output_letter(n: usize) -> String {
    parameter_string(OUTPUT_OFFSET, n)
}
