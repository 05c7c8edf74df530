/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors shared by the adapters

use core::fmt::{Debug, Display, Formatter};

/// Errors raised by a [`ByteSource`](crate::input::ByteSource)
#[non_exhaustive]
pub enum InputError {
    /// The file could not be opened
    Open(std::io::Error),
    /// A read from the underlying source failed
    Read(std::io::Error),
    /// Generic message
    GenericStatic(&'static str),
    /// Generic allocated message
    Generic(String)
}

impl Debug for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{self}")
    }
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "Could not open input: {err}"),
            Self::Read(err) => write!(f, "Could not read input: {err}"),
            Self::GenericStatic(message) => write!(f, "{message}"),
            Self::Generic(message) => write!(f, "{message}")
        }
    }
}

impl std::error::Error for InputError {}

impl From<std::io::Error> for InputError {
    fn from(value: std::io::Error) -> Self {
        InputError::Read(value)
    }
}

impl From<&'static str> for InputError {
    fn from(value: &'static str) -> Self {
        InputError::GenericStatic(value)
    }
}

/// A closed set of error messages an adapter can place in its result.
///
/// Results carry errors as plain strings, an empty string meaning
/// success. Types implementing this map those strings back to
/// a typed variant and forth.
pub trait ErrorVocabulary: Sized + Copy + 'static {
    /// Every variant of the vocabulary
    const ALL: &'static [Self];

    /// The exact text placed in a result for this variant.
    ///
    /// Variants whose message carries a payload return the
    /// fixed prefix only.
    fn message(self) -> &'static str;

    /// Whether a variant's message is a prefix to which a payload is appended
    fn has_payload(self) -> bool {
        false
    }

    /// Map a result's error text back to a variant.
    ///
    /// Returns `None` for empty text or text outside the vocabulary.
    fn classify(text: &str) -> Option<Self> {
        if text.is_empty() {
            return None;
        }
        Self::ALL.iter().copied().find(|variant| {
            if variant.has_payload() {
                text.starts_with(variant.message())
            } else {
                text == variant.message()
            }
        })
    }
}
