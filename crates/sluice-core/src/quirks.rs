/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Translation of typed quirk options into the flat key/value
//! pairs engines look quirks up in.

/// A single quirk handed to an engine
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuirkKeyValuePair {
    pub key:   u32,
    pub value: u64
}

impl QuirkKeyValuePair {
    pub const fn new(key: u32, value: u64) -> QuirkKeyValuePair {
        QuirkKeyValuePair { key, value }
    }
}

/// A typed quirk with a stable numeric identifier
pub trait Quirk: Copy {
    /// The identifier engines know this quirk by
    fn id(self) -> u32;
}

/// Convert quirks and their values into engine key/value pairs.
///
/// Pairs come out in the iteration order of `quirks`, nothing is
/// sorted or de-duplicated. An empty input gives an empty vector.
pub fn convert_quirks<Q, I>(quirks: I) -> Vec<QuirkKeyValuePair>
where
    Q: Quirk,
    I: IntoIterator<Item = (Q, u64)>
{
    quirks
        .into_iter()
        .map(|(quirk, value)| QuirkKeyValuePair::new(quirk.id(), value))
        .collect()
}

/// Look up the value a quirk was set to, the first occurrence wins
pub fn quirk_value(quirks: &[QuirkKeyValuePair], key: u32) -> Option<u64> {
    quirks.iter().find(|pair| pair.key == key).map(|pair| pair.value)
}
