/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Turns serde_json's visitor calls into [`JsonCallbacks`] calls

use core::fmt::Formatter;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

use crate::engine::pointer::array_index;
use crate::engine::{JsonCallbacks, StructureFlags};

/// Callbacks plus what the walk learned along the way
pub(crate) struct Sink<'a> {
    callbacks:   &'a mut dyn JsonCallbacks,
    /// The first error a callback returned, verbatim
    pub failure: Option<String>,
    /// Whether the JSON pointer selected a value
    pub matched: bool
}

impl<'a> Sink<'a> {
    pub fn new(callbacks: &'a mut dyn JsonCallbacks) -> Sink<'a> {
        Sink {
            callbacks,
            failure: None,
            matched: false
        }
    }

    /// Stash a callback error and abort the walk
    fn check<E: de::Error>(&mut self, status: Result<(), String>) -> Result<(), E> {
        status.map_err(|message| {
            let err = E::custom(&message);
            self.failure = Some(message);
            err
        })
    }
}

/// The flag a pop reports when returning to `parent`
fn returning_to(parent: StructureFlags) -> StructureFlags {
    if parent.contains(StructureFlags::FROM_LIST) {
        StructureFlags::TO_LIST
    } else if parent.contains(StructureFlags::FROM_DICT) {
        StructureFlags::TO_DICT
    } else {
        StructureFlags::TO_NONE
    }
}

/// Reports a value, and everything nested in it, to the sink
pub(crate) struct ValueSeed<'s, 'a> {
    pub sink:   &'s mut Sink<'a>,
    /// `FROM_*` flag of the enclosing container
    pub parent: StructureFlags
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_, '_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ValueSeed<'_, '_> {
    type Value = ();

    fn expecting(&self, formatter: &mut Formatter) -> core::fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        let status = self.sink.callbacks.append_bool(v);
        self.sink.check(status)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        let status = self.sink.callbacks.append_i64(v);
        self.sink.check(status)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        let status = match i64::try_from(v) {
            Ok(v) => self.sink.callbacks.append_i64(v),
            Err(_) => self.sink.callbacks.append_f64(v as f64)
        };
        self.sink.check(status)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        let status = self.sink.callbacks.append_f64(v);
        self.sink.check(status)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.visit_string(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<(), E> {
        let status = self.sink.callbacks.append_text_string(v);
        self.sink.check(status)
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        let status = self.sink.callbacks.append_null();
        self.sink.check(status)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>
    {
        let ValueSeed { sink, parent } = self;

        let status = sink
            .callbacks
            .push(StructureFlags::PUSH | parent | StructureFlags::TO_LIST);
        sink.check(status)?;

        while seq
            .next_element_seed(ValueSeed {
                sink:   &mut *sink,
                parent: StructureFlags::FROM_LIST
            })?
            .is_some()
        {}

        let status = sink
            .callbacks
            .pop(StructureFlags::POP | StructureFlags::FROM_LIST | returning_to(parent));
        sink.check(status)
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>
    {
        let ValueSeed { sink, parent } = self;

        let status = sink
            .callbacks
            .push(StructureFlags::PUSH | parent | StructureFlags::TO_DICT);
        sink.check(status)?;

        // keys are reported like any other string
        while map
            .next_key_seed(ValueSeed {
                sink:   &mut *sink,
                parent: StructureFlags::FROM_DICT
            })?
            .is_some()
        {
            map.next_value_seed(ValueSeed {
                sink:   &mut *sink,
                parent: StructureFlags::FROM_DICT
            })?;
        }

        let status = sink
            .callbacks
            .pop(StructureFlags::POP | StructureFlags::FROM_DICT | returning_to(parent));
        sink.check(status)
    }
}

/// Skips over the document until the reference tokens select a value,
/// then reports that value
pub(crate) struct PointerSeed<'s, 'a, 'p> {
    pub sink:   &'s mut Sink<'a>,
    pub tokens: &'p [String]
}

impl<'de> DeserializeSeed<'de> for PointerSeed<'_, '_, '_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>
    {
        match self.tokens.split_first() {
            None => {
                self.sink.matched = true;
                ValueSeed {
                    sink:   self.sink,
                    parent: StructureFlags::FROM_NONE
                }
                .deserialize(deserializer)
            }
            Some((head, rest)) => deserializer.deserialize_any(PointerStep {
                sink: self.sink,
                head: head.as_str(),
                rest
            })
        }
    }
}

struct PointerStep<'s, 'a, 'p> {
    sink: &'s mut Sink<'a>,
    head: &'p str,
    rest: &'p [String]
}

impl<'de> Visitor<'de> for PointerStep<'_, '_, '_> {
    type Value = ();

    fn expecting(&self, formatter: &mut Formatter) -> core::fmt::Result {
        formatter.write_str("a JSON value")
    }

    // scalars have nothing to descend into

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<(), E> {
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<(), E> {
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<(), E> {
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<(), E> {
        Ok(())
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<(), E> {
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>
    {
        let PointerStep { sink, head, rest } = self;
        let selected = array_index(head);

        let mut index = 0;
        loop {
            let more = if selected == Some(index) {
                seq.next_element_seed(PointerSeed {
                    sink:   &mut *sink,
                    tokens: rest
                })?
                .is_some()
            } else {
                seq.next_element::<IgnoredAny>()?.is_some()
            };
            if !more {
                return Ok(());
            }
            index += 1;
        }
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>
    {
        let PointerStep { sink, head, rest } = self;

        // the first of duplicate keys wins
        let mut found = false;
        while let Some(key) = map.next_key::<String>()? {
            if !found && key == head {
                found = true;
                map.next_value_seed(PointerSeed {
                    sink:   &mut *sink,
                    tokens: rest
                })?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(())
    }
}
