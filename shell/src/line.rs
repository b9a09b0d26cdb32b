/// Line assembler.
///
/// Collects bytes from the transport into a fixed buffer until a line
/// terminator arrives. Reads can split a line anywhere, and one read can
/// carry several lines; bytes past a terminator stay buffered and seed the
/// next line.
///
/// A line that fills the whole buffer without a terminator is discarded.
use crate::LINE_TERMINATOR;

/// Outcome of recording a read with [`LineAssembler::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// No terminator yet; keep reading.
    Pending,
    /// A complete line is available from [`LineAssembler::line`].
    Ready,
    /// The buffer filled up without a terminator. Its contents were dropped.
    Overflow,
}

pub struct LineAssembler<const N: usize> {
    buf: [u8; N],
    /// Bytes of `buf` holding input.
    fill: usize,
    /// Prefix of `buf[..fill]` known to contain no terminator.
    scanned: usize,
    /// Index of the terminator ending the current line, if one was found.
    terminator: Option<usize>,
}

impl<const N: usize> LineAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            fill: 0,
            scanned: 0,
            terminator: None,
        }
    }

    /// The unfilled tail of the buffer, where the next read should land.
    ///
    /// Empty while a complete line is waiting to be finished.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        if self.terminator.is_some() {
            return &mut [];
        }
        &mut self.buf[self.fill..]
    }

    /// Record `count` bytes just read into [`spare_mut`](Self::spare_mut)
    /// and scan them for a terminator.
    pub fn commit(&mut self, count: usize) -> Feed {
        if self.terminator.is_some() {
            return Feed::Ready;
        }
        self.fill = (self.fill + count).min(N);
        if self.scan() {
            return Feed::Ready;
        }
        if self.fill >= N {
            self.clear();
            return Feed::Overflow;
        }
        Feed::Pending
    }

    /// The complete line, without its terminator.
    pub fn line(&self) -> Option<&[u8]> {
        self.terminator.map(|end| &self.buf[..end])
    }

    pub fn has_line(&self) -> bool {
        self.terminator.is_some()
    }

    /// Drop the current line and keep whatever followed its terminator.
    ///
    /// Returns true if the kept bytes already hold another complete line.
    pub fn finish_line(&mut self) -> bool {
        let Some(end) = self.terminator.take() else {
            return false;
        };
        let next = end + 1;
        self.buf.copy_within(next..self.fill, 0);
        self.fill -= next;
        self.scanned = 0;
        self.scan()
    }

    /// Number of buffered bytes, including any complete line.
    pub fn buffered(&self) -> usize {
        self.fill
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Discard everything, complete line included.
    pub fn clear(&mut self) {
        self.fill = 0;
        self.scanned = 0;
        self.terminator = None;
    }

    /// Look for a terminator in the bytes not scanned yet.
    fn scan(&mut self) -> bool {
        let fresh = &self.buf[self.scanned..self.fill];
        match fresh.iter().position(|&b| b == LINE_TERMINATOR) {
            Some(offset) => {
                self.terminator = Some(self.scanned + offset);
                true
            }
            None => {
                self.scanned = self.fill;
                false
            }
        }
    }
}

impl<const N: usize> Default for LineAssembler<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    /// Feed `chunk` through `spare_mut`/`commit`, as a transport read would.
    fn feed<const N: usize>(asm: &mut LineAssembler<N>, chunk: &[u8]) -> Feed {
        let spare = asm.spare_mut();
        assert!(chunk.len() <= spare.len(), "chunk larger than spare room");
        spare[..chunk.len()].copy_from_slice(chunk);
        asm.commit(chunk.len())
    }

    #[test]
    fn single_read_line() {
        let mut asm = LineAssembler::<64>::new();
        assert_eq!(feed(&mut asm, b"help me\n"), Feed::Ready);
        assert_eq!(asm.line(), Some(&b"help me"[..]));
        assert!(!asm.finish_line());
        assert_eq!(asm.buffered(), 0);
    }

    #[test]
    fn zero_byte_read_is_pending() {
        let mut asm = LineAssembler::<16>::new();
        assert_eq!(asm.commit(0), Feed::Pending);
        assert_eq!(feed(&mut asm, b"ls"), Feed::Pending);
        assert_eq!(asm.commit(0), Feed::Pending);
        assert_eq!(asm.buffered(), 2);
        assert_eq!(asm.line(), None);
    }

    #[test]
    fn assembly_is_independent_of_fragmentation() {
        let input = b"echo hello world\nrest";
        for first in 0..=input.len() {
            for second in first..=input.len() {
                let mut asm = LineAssembler::<64>::new();
                let mut ready = false;
                for chunk in [&input[..first], &input[first..second], &input[second..]] {
                    if ready {
                        break;
                    }
                    // Later chunks would only be read after the line is dispatched.
                    ready = feed(&mut asm, chunk) == Feed::Ready;
                }
                assert!(ready, "split at {first}/{second} never completed");
                assert_eq!(asm.line(), Some(&b"echo hello world"[..]));
            }
        }
    }

    #[test]
    fn overflow_discards_buffer_once() {
        let mut asm = LineAssembler::<8>::new();
        assert_eq!(feed(&mut asm, b"abcde"), Feed::Pending);
        assert_eq!(feed(&mut asm, b"fgh"), Feed::Overflow);
        assert_eq!(asm.buffered(), 0);
        assert_eq!(asm.line(), None);

        // Input after the overflow starts a fresh line.
        assert_eq!(feed(&mut asm, b"ls\n"), Feed::Ready);
        assert_eq!(asm.line(), Some(&b"ls"[..]));
    }

    #[test]
    fn terminator_in_last_slot_is_not_overflow() {
        let mut asm = LineAssembler::<4>::new();
        assert_eq!(feed(&mut asm, b"abc\n"), Feed::Ready);
        assert_eq!(asm.line(), Some(&b"abc"[..]));
    }

    #[test]
    fn pipelined_lines_are_kept_in_order() {
        let mut asm = LineAssembler::<64>::new();
        assert_eq!(feed(&mut asm, b"one\ntwo\nthr"), Feed::Ready);

        let mut lines: Vec<Vec<u8>> = Vec::new();
        lines.push(asm.line().unwrap().to_vec());
        assert!(asm.finish_line());
        lines.push(asm.line().unwrap().to_vec());
        assert!(!asm.finish_line());
        assert_eq!(asm.buffered(), 3);

        assert_eq!(feed(&mut asm, b"ee\n"), Feed::Ready);
        lines.push(asm.line().unwrap().to_vec());

        assert_eq!(lines, [b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
    }

    #[test]
    fn carried_bytes_are_not_rescanned_past_their_end() {
        let mut asm = LineAssembler::<16>::new();
        assert_eq!(feed(&mut asm, b"a\nbcd"), Feed::Ready);
        assert!(!asm.finish_line());
        assert_eq!(asm.spare_mut().len(), 16 - 3);
        assert_eq!(feed(&mut asm, b"\n"), Feed::Ready);
        assert_eq!(asm.line(), Some(&b"bcd"[..]));
    }

    #[test]
    fn spare_is_empty_while_line_waits() {
        let mut asm = LineAssembler::<16>::new();
        feed(&mut asm, b"x\ny");
        assert!(asm.spare_mut().is_empty());
        assert_eq!(asm.commit(0), Feed::Ready);
        asm.finish_line();
        assert_eq!(asm.spare_mut().len(), 15);
    }

    #[test]
    fn empty_line() {
        let mut asm = LineAssembler::<16>::new();
        assert_eq!(feed(&mut asm, b"\n"), Feed::Ready);
        assert_eq!(asm.line(), Some(&b""[..]));
    }

    #[test]
    fn clear_drops_pending_line() {
        let mut asm = LineAssembler::<16>::new();
        feed(&mut asm, b"a\nb");
        asm.clear();
        assert_eq!(asm.buffered(), 0);
        assert!(!asm.has_line());
        assert_eq!(asm.spare_mut().len(), asm.capacity());
    }
}
