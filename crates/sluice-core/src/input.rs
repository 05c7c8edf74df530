/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Blocking byte sources handed to the decode engines.
//!
//! Engines pull bytes out of a [`ByteSource`], the adapters only ever
//! construct one of the two implementations here, an in-memory
//! [`MemoryInput`] or a [`FileInput`] wrapping an open file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::errors::InputError;

/// The input trait consumed by decode engines.
///
/// Reads are blocking and sequential, there is no seeking.
pub trait ByteSource {
    /// Read bytes into `buf` returning how many bytes were read.
    ///
    /// A return of `Ok(0)` with a non-empty `buf` means end of input
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, InputError>;

    /// Number of bytes handed out so far
    fn position(&self) -> u64;

    /// Read everything remaining into `sink`, returning the number of bytes added
    fn read_to_end(&mut self, sink: &mut Vec<u8>) -> Result<usize, InputError> {
        let start = sink.len();
        let mut chunk = [0_u8; 4096];
        loop {
            let read = self.read_bytes(&mut chunk)?;
            if read == 0 {
                break;
            }
            sink.extend_from_slice(&chunk[..read]);
        }
        Ok(sink.len() - start)
    }
}

/// An in-memory byte source over a borrowed slice
pub struct MemoryInput<'a> {
    data:     &'a [u8],
    position: usize
}

impl<'a> MemoryInput<'a> {
    pub const fn new(data: &'a [u8]) -> MemoryInput<'a> {
        MemoryInput { data, position: 0 }
    }

    /// Bytes not yet handed out
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}

impl ByteSource for MemoryInput<'_> {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, InputError> {
        let remaining = self.remaining();
        let count = remaining.len().min(buf.len());
        buf[..count].copy_from_slice(&remaining[..count]);
        self.position += count;
        Ok(count)
    }

    fn position(&self) -> u64 {
        self.position as u64
    }

    fn read_to_end(&mut self, sink: &mut Vec<u8>) -> Result<usize, InputError> {
        let remaining = self.remaining();
        sink.extend_from_slice(remaining);
        self.position = self.data.len();
        Ok(remaining.len())
    }
}

/// A byte source reading from a file on disk.
///
/// The file is closed when this is dropped.
pub struct FileInput {
    reader:   BufReader<File>,
    position: u64
}

impl FileInput {
    /// Open the file at `path` for reading
    ///
    /// # Errors
    /// [`InputError::Open`] if the file cannot be opened
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileInput, InputError> {
        let file = File::open(path.as_ref()).map_err(InputError::Open)?;
        Ok(FileInput::new(file))
    }

    pub fn new(file: File) -> FileInput {
        FileInput {
            reader:   BufReader::new(file),
            position: 0
        }
    }
}

impl ByteSource for FileInput {
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, InputError> {
        let count = self.reader.read(buf).map_err(InputError::Read)?;
        self.position += count as u64;
        Ok(count)
    }

    fn position(&self) -> u64 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_input_reads_in_chunks() {
        let data = [1_u8, 2, 3, 4, 5];
        let mut input = MemoryInput::new(&data);
        let mut buf = [0_u8; 2];

        assert_eq!(input.read_bytes(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(input.position(), 2);

        let mut rest = Vec::new();
        assert_eq!(input.read_to_end(&mut rest).unwrap(), 3);
        assert_eq!(rest, [3, 4, 5]);
        assert_eq!(input.read_bytes(&mut buf).unwrap(), 0);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let err = FileInput::open("/this/path/does/not/exist.bin")
            .err()
            .unwrap();
        assert!(matches!(err, InputError::Open(_)));
    }
}
