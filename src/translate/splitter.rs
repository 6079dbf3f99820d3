//! Boundary-aware text chunking.
//!
//! Text longer than the limit is cut at sentence ends, then clause separators, then
//! whitespace. Pieces are packed greedily and joined with single spaces, so the chunks
//! reproduce the input modulo whitespace. A word longer than the limit is emitted whole.

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];
const CLAUSE_SEPARATORS: &[char] = &[',', ';', ':'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    Sentence,
    Clause,
    Word,
}

impl Boundary {
    fn finer(self) -> Option<Boundary> {
        match self {
            Boundary::Sentence => Some(Boundary::Clause),
            Boundary::Clause => Some(Boundary::Word),
            Boundary::Word => None,
        }
    }

    fn split(self, text: &str) -> Vec<&str> {
        match self {
            Boundary::Sentence => split_after(text, SENTENCE_TERMINATORS),
            Boundary::Clause => split_after(text, CLAUSE_SEPARATORS),
            Boundary::Word => text.split_whitespace().collect(),
        }
    }
}

/// Split `text` into ordered chunks of at most `max_length` characters
pub fn split_text(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let text = text.trim();

    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= max_length {
        return vec![text.to_string()];
    }

    let mut packer = Packer::new(max_length);
    for sentence in Boundary::Sentence.split(text) {
        packer.push(sentence, Boundary::Sentence);
    }
    packer.finish()
}

struct Packer {
    max_length: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl Packer {
    fn new(max_length: usize) -> Self {
        Self {
            max_length,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    fn push(&mut self, piece: &str, level: Boundary) {
        let piece = piece.trim();
        if piece.is_empty() {
            return;
        }

        let piece_len = char_len(piece);
        if piece_len > self.max_length {
            match level.finer() {
                Some(finer) => {
                    for sub in finer.split(piece) {
                        self.push(sub, finer);
                    }
                }
                None => {
                    // Indivisible token, kept whole
                    self.flush();
                    self.chunks.push(piece.to_string());
                }
            }
            return;
        }

        let joined_len = if self.current.is_empty() {
            piece_len
        } else {
            self.current_len + 1 + piece_len
        };

        if joined_len > self.max_length {
            self.flush();
        }

        if !self.current.is_empty() {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(piece);
        self.current_len += piece_len;
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.chunks.push(std::mem::take(&mut self.current).trim().to_string());
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}

/// Split after every marker character that is followed by whitespace.
/// The marker stays with the left piece, the whitespace run is dropped.
fn split_after<'a>(text: &'a str, markers: &[char]) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut piece_start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !markers.contains(&c) {
            continue;
        }
        let Some(&(next_idx, next)) = chars.peek() else {
            break;
        };
        if !next.is_whitespace() {
            continue;
        }

        pieces.push(&text[piece_start..next_idx]);
        piece_start = next_idx;
        while let Some(&(ws_idx, ws)) = chars.peek() {
            if !ws.is_whitespace() {
                break;
            }
            piece_start = ws_idx + ws.len_utf8();
            chars.next();
        }
    }

    if piece_start < text.len() {
        pieces.push(&text[piece_start..]);
    }
    pieces
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
