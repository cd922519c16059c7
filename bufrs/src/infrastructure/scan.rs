//! Scanning helpers over buffered input.
//!
//! These work directly on the adapter's buffer through [`BufferedInput`]:
//! look at the unread units, consume what was used, refill when exhausted.
//! Tokens and lines may span any number of refills.

use crate::domain::{ports::BufferedInput, value_objects::CodeUnit};
use alloc::vec::Vec;

/// Append everything left in `input` to `out`.
///
/// Returns the number of units appended.
///
/// # Errors
///
/// Returns the first refill error; units appended before it stay in `out`.
pub fn read_to_end<B: BufferedInput>(
    input: &mut B,
    out: &mut Vec<B::Unit>,
) -> Result<usize, B::Error> {
    let mut total = 0;
    while input.fill()? {
        let unread = input.unread();
        let n = unread.len();
        out.extend_from_slice(unread);
        input.consume(n);
        total += n;
    }
    Ok(total)
}

/// Read the next whitespace-delimited token into `token`.
///
/// Leading whitespace is skipped and the delimiter after the token is left
/// unread. Returns `false` if the input ended before a token started.
///
/// # Errors
///
/// Returns the first refill error.
pub fn next_token<B: BufferedInput>(
    input: &mut B,
    token: &mut Vec<B::Unit>,
) -> Result<bool, B::Error> {
    token.clear();

    loop {
        if !input.fill()? {
            return Ok(false);
        }
        let unread = input.unread();
        let skip = unread.iter().take_while(|u| u.is_space()).count();
        let found = skip < unread.len();
        input.consume(skip);
        if found {
            break;
        }
    }

    loop {
        let unread = input.unread();
        let len = unread.iter().take_while(|u| !u.is_space()).count();
        token.extend_from_slice(&unread[..len]);
        let ended = len < unread.len();
        input.consume(len);
        if ended || !input.fill()? {
            return Ok(true);
        }
    }
}

/// Read one line into `line`, without its `\n`.
///
/// Returns `false` only when the input was already exhausted. A final line
/// without a terminator is still returned.
///
/// # Errors
///
/// Returns the first refill error.
pub fn read_line<B: BufferedInput>(
    input: &mut B,
    line: &mut Vec<B::Unit>,
) -> Result<bool, B::Error> {
    line.clear();
    let mut any = false;

    while input.fill()? {
        any = true;
        let unread = input.unread();
        match unread.iter().position(|u| u.is_newline()) {
            Some(i) => {
                line.extend_from_slice(&unread[..i]);
                input.consume(i + 1);
                return Ok(true);
            }
            None => {
                let n = unread.len();
                line.extend_from_slice(unread);
                input.consume(n);
            }
        }
    }
    Ok(any)
}

/// Iterator over the whitespace-delimited tokens of `input`.
///
/// Stops at end of input or at the first error, which is yielded.
pub fn tokens<B: BufferedInput>(input: &mut B) -> Tokens<'_, B> {
    Tokens { input, done: false }
}

/// Iterator returned by [`tokens`].
pub struct Tokens<'a, B> {
    input: &'a mut B,
    done: bool,
}

impl<B: BufferedInput> Iterator for Tokens<'_, B> {
    type Item = Result<Vec<B::Unit>, B::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut token = Vec::new();
        match next_token(self.input, &mut token) {
            Ok(true) => Some(Ok(token)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adapters::InputBuffer, infrastructure::MemoryHandle};

    fn input<const CAP: usize>(text: &str) -> InputBuffer<MemoryHandle<u8>, CAP> {
        InputBuffer::new(MemoryHandle::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_tokens_span_refills() {
        let mut input = input::<3>("  alpha\tbeta\n\n gamma  ");
        let words: Vec<Vec<u8>> = tokens(&mut input).collect::<Result<_, _>>().unwrap();
        assert_eq!(words, [b"alpha".to_vec(), b"beta".to_vec(), b"gamma".to_vec()]);
    }

    #[test]
    fn test_next_token_leaves_delimiter() {
        let mut input = input::<16>("ab cd");
        let mut token = Vec::new();
        assert!(next_token(&mut input, &mut token).unwrap());
        assert_eq!(token, b"ab");
        assert_eq!(input.unread(), b" cd");
    }

    #[test]
    fn test_next_token_on_blank_input() {
        let mut input = input::<4>("   \n  ");
        let mut token = Vec::new();
        assert!(!next_token(&mut input, &mut token).unwrap());
        assert!(token.is_empty());
    }

    #[test]
    fn test_read_line() {
        let mut input = input::<4>("first line\n\nlast");
        let mut line = Vec::new();

        assert!(read_line(&mut input, &mut line).unwrap());
        assert_eq!(line, b"first line");
        assert!(read_line(&mut input, &mut line).unwrap());
        assert!(line.is_empty());
        assert!(read_line(&mut input, &mut line).unwrap());
        assert_eq!(line, b"last");
        assert!(!read_line(&mut input, &mut line).unwrap());
    }

    #[test]
    fn test_read_to_end_after_partial_read() {
        let mut input = input::<4>("0123456789");
        let mut head = [0u8; 3];
        input.read(&mut head).unwrap();

        let mut rest = Vec::new();
        assert_eq!(read_to_end(&mut input, &mut rest).unwrap(), 7);
        assert_eq!(rest, b"3456789");
    }

    #[test]
    fn test_wide_units() {
        let text: Vec<char> = "αβ γ".chars().collect();
        let mut input = InputBuffer::<_, 2>::new(MemoryHandle::new(text));
        let words: Vec<String> = tokens(&mut input)
            .map(|t| t.map(|units| units.into_iter().collect()))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(words, ["αβ", "γ"]);
    }
}
