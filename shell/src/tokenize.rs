/// Word splitting.
///
/// A line is split on every single space. Consecutive spaces produce empty
/// words; with no quoting, that is the only way to pass an empty argument.
use core::ops::Deref;

use crate::ARG_SEPARATOR;

const NO_WORD: &[u8] = &[];

/// Words of one line, borrowed from the line buffer.
///
/// Holds at most `M` words. The borrow ends before the buffer can be
/// refilled, so words never outlive the line they came from.
pub struct Tokens<'a, const M: usize> {
    argv: [&'a [u8]; M],
    argc: usize,
    truncated: bool,
}

impl<'a, const M: usize> Tokens<'a, M> {
    /// Split `line` into words.
    ///
    /// A word starts at the beginning of the line and after every space that
    /// is not the last byte. Collection stops after `M` words; if the line
    /// has more, [`is_truncated`](Self::is_truncated) reports it.
    pub fn split(line: &'a [u8]) -> Self {
        let mut tokens = Self {
            argv: [NO_WORD; M],
            argc: 0,
            truncated: false,
        };

        let mut rest = line;
        while !rest.is_empty() {
            if tokens.argc == M {
                tokens.truncated = true;
                break;
            }
            let word = match rest.iter().position(|&b| b == ARG_SEPARATOR) {
                Some(space) => {
                    let (word, tail) = rest.split_at(space);
                    rest = &tail[1..];
                    word
                }
                None => core::mem::take(&mut rest),
            };
            tokens.argv[tokens.argc] = word;
            tokens.argc += 1;
        }

        tokens
    }

    pub fn argc(&self) -> usize {
        self.argc
    }

    pub fn argv(&self) -> &[&'a [u8]] {
        &self.argv[..self.argc]
    }

    /// True if words past the `M`-th were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Index of the last word kept when the line was truncated.
    pub const fn last_index() -> usize {
        M - 1
    }
}

impl<'a, const M: usize> Deref for Tokens<'a, M> {
    type Target = [&'a [u8]];

    fn deref(&self) -> &Self::Target {
        self.argv()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words<const M: usize>(line: &[u8]) -> (std::vec::Vec<&[u8]>, bool) {
        let tokens = Tokens::<M>::split(line);
        (tokens.argv().to_vec(), tokens.is_truncated())
    }

    #[test]
    fn splits_on_single_spaces() {
        let tokens = Tokens::<8>::split(b"a b c");
        assert_eq!(tokens.argc(), 3);
        assert_eq!(tokens.argv(), [&b"a"[..], b"b", b"c"]);
        assert!(!tokens.is_truncated());
    }

    #[test]
    fn empty_line_has_no_words() {
        let tokens = Tokens::<8>::split(b"");
        assert_eq!(tokens.argc(), 0);
        assert!(tokens.is_empty());
    }

    #[test]
    fn double_space_yields_empty_word() {
        let (argv, _) = words::<8>(b"a  b");
        assert_eq!(argv, [&b"a"[..], b"", b"b"]);
    }

    #[test]
    fn leading_space_yields_empty_first_word() {
        let (argv, _) = words::<8>(b" ls");
        assert_eq!(argv, [&b""[..], b"ls"]);

        let (argv, _) = words::<8>(b" ");
        assert_eq!(argv, [&b""[..]]);
    }

    #[test]
    fn single_trailing_space_adds_nothing() {
        let (argv, _) = words::<8>(b"ls ");
        assert_eq!(argv, [&b"ls"[..]]);

        let (argv, _) = words::<8>(b"ls  ");
        assert_eq!(argv, [&b"ls"[..], b""]);
    }

    #[test]
    fn stops_at_capacity() {
        let (argv, truncated) = words::<3>(b"a b c d e");
        assert_eq!(argv, [&b"a"[..], b"b", b"c"]);
        assert!(truncated);
        assert_eq!(Tokens::<3>::last_index(), 2);
    }

    #[test]
    fn exactly_at_capacity_is_not_truncated() {
        let (argv, truncated) = words::<3>(b"a b c");
        assert_eq!(argv.len(), 3);
        assert!(!truncated);

        // A trailing space does not start a fourth word.
        let (_, truncated) = words::<3>(b"a b c ");
        assert!(!truncated);
    }

    #[test]
    fn non_utf8_bytes_pass_through() {
        let (argv, _) = words::<4>(b"put \xff\xfe");
        assert_eq!(argv, [&b"put"[..], b"\xff\xfe"]);
    }
}
