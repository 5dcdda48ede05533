//! The program loader: turns a byte stream into the words that populate
//! segment 0.

use std::io::Read;

use crate::error::StartupError;
use crate::Word;

const WORD_BYTES: usize = 4;

/// A fully decoded program, ready to be handed to
/// [`Machine::new`](crate::Machine::new).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    words: Vec<Word>,
}

impl Program {
    /// Reads `expected_words` words from `source`, failing if the stream
    /// runs dry first. `expected_words` is computed by the caller from the
    /// file's size on disk (the size probe is an external concern – see the
    /// crate's module docs); trailing bytes past `expected_words * 4` are
    /// ignored rather than read, matching a file whose size is not a
    /// multiple of four.
    pub fn read(
        path: &str,
        expected_words: usize,
        source: &mut impl Read,
    ) -> Result<Program, StartupError> {
        let mut bytes = vec![0u8; expected_words * WORD_BYTES];
        let mut filled = 0;
        while filled < bytes.len() {
            let read = source
                .read(&mut bytes[filled..])
                .map_err(|source| StartupError::ReadProgram {
                    path: path.to_string(),
                    source,
                })?;
            if read == 0 {
                return Err(StartupError::TruncatedProgram {
                    path: path.to_string(),
                    expected: expected_words,
                    found: filled,
                });
            }
            filled += read;
        }
        Ok(Program::from_bytes(&bytes))
    }

    /// Groups `bytes` into big-endian words, discarding any trailing bytes
    /// that do not complete a whole word.
    pub fn from_bytes(bytes: &[u8]) -> Program {
        let word_count = bytes.len() / WORD_BYTES;
        let words = bytes[..word_count * WORD_BYTES]
            .chunks_exact(WORD_BYTES)
            .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Program { words }
    }

    /// The decoded words, in the order they were read.
    pub fn into_words(self) -> Vec<Word> {
        self.words
    }

    /// Number of decoded words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_big_endian_words() {
        let bytes = [0x00, 0x00, 0x00, 0x01, 0xFF, 0x00, 0x00, 0x02];
        let program = Program::from_bytes(&bytes);
        assert_eq!(program.into_words(), vec![1, 0xFF00_0002]);
    }

    #[test]
    fn trailing_short_bytes_are_ignored() {
        let bytes = [0x00, 0x00, 0x00, 0x01, 0xAB, 0xCD];
        let program = Program::from_bytes(&bytes);
        assert_eq!(program.into_words(), vec![1]);
    }

    #[test]
    fn empty_input_decodes_to_zero_words() {
        let program = Program::from_bytes(&[]);
        assert!(program.is_empty());
    }

    #[test]
    fn read_reports_io_errors_as_startup_errors() {
        struct FailingReader;
        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
        }
        let mut reader = FailingReader;
        let err = Program::read("fixture.um", 1, &mut reader).unwrap_err();
        assert!(matches!(err, StartupError::ReadProgram { .. }));
    }

    #[test]
    fn read_reports_a_short_stream_as_truncated() {
        let mut source: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0x00, 0x00];
        let err = Program::read("fixture.um", 2, &mut source).unwrap_err();
        match err {
            StartupError::TruncatedProgram { expected, found, .. } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 6);
            }
            other => panic!("expected TruncatedProgram, got {other:?}"),
        }
    }

    #[test]
    fn read_decodes_exactly_the_expected_word_count() {
        let mut source: &[u8] = &[0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xFF, 0xFF];
        let program = Program::read("fixture.um", 2, &mut source).unwrap();
        assert_eq!(program.into_words(), vec![1, 2]);
    }
}
