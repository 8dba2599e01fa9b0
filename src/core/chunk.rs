use thiserror::Error;
use tracing::debug;

/// Default maximum chunk size, in characters.
const RECURSIVE_DEFAULT_SIZE: usize = 500;
/// Default overlap between neighbouring chunks, in characters.
const RECURSIVE_DEFAULT_OVERLAP: usize = 20;

/// Delimiters ordered from the most to the least desirable split boundary:
/// paragraphs, lines, sentences, words, characters.
const DEFAULT_DELIMS: &[&str] = &["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Error)]
pub enum ChunkerError {
    #[error("{0}")]
    Config(String),
}

/// A chunker based on langchain's `RecursiveCharacterTextSplitter`.
///
/// The input is split with the first delimiter and the splits are packed
/// into chunks of at most `size - overlap` characters. Splits too large to
/// fit a single chunk are split again with the next delimiter in the chain,
/// down to a plain character split. Every chunk after the first is then
/// prefixed with the trailing `overlap` characters of its predecessor, so
/// neighbouring chunks share exactly that many characters and no chunk
/// exceeds `size`.
///
/// All lengths are measured in characters, never splitting inside a code
/// point.
#[derive(Debug, Clone)]
pub struct Recursive {
    pub size: usize,
    pub overlap: usize,
    delims: &'static [&'static str],
}

impl Recursive {
    /// Create a new `Recursive` chunker.
    /// Errors if `overlap` is not less than `size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, ChunkerError> {
        if overlap >= size {
            return Err(ChunkerError::Config(
                "overlap must be less than size".to_string(),
            ));
        }
        Ok(Self {
            size,
            overlap,
            delims: DEFAULT_DELIMS,
        })
    }

    /// Chunk the input using this instance's delimiters.
    ///
    /// Inputs of at most `size` characters come back as a single chunk equal
    /// to the input; whitespace-only inputs produce no chunks.
    pub fn chunk(&self, input: &str) -> Vec<String> {
        if input.trim().is_empty() {
            return vec![];
        }

        if char_len(input) <= self.size {
            return vec![input.to_string()];
        }

        let mut pieces = vec![];
        self.chunk_recursive(input, 0, self.size - self.overlap, &mut pieces);

        let mut chunks: Vec<String> = Vec::with_capacity(pieces.len());

        for piece in pieces {
            match chunks.last() {
                Some(previous) => {
                    let mut chunk = char_tail(previous, self.overlap);
                    chunk.push_str(&piece);
                    chunks.push(chunk);
                }
                None => chunks.push(piece),
            }
        }

        debug!(
            "Chunked {} chunks, avg chunk size: {}",
            chunks.len(),
            if chunks.is_empty() {
                0
            } else {
                chunks.iter().fold(0, |acc, el| acc + char_len(el)) / chunks.len()
            }
        );

        chunks
    }

    /// Split `input` with `delims[idx]`, packing the splits into pieces of
    /// at most `max` characters. Splits larger than `max` go through
    /// another round with the next delimiter; with no delimiters left the
    /// split is a plain character window.
    fn chunk_recursive(&self, input: &str, idx: usize, max: usize, out: &mut Vec<String>) {
        if char_len(input) <= max {
            if !input.trim().is_empty() {
                out.push(input.to_string());
            }
            return;
        }

        let Some(delim) = self.delims.get(idx) else {
            return hard_split(input, max, out);
        };

        if delim.is_empty() {
            return hard_split(input, max, out);
        }

        let mut buffer = String::new();

        for split in input.split_inclusive(delim) {
            if char_len(&buffer) + char_len(split) <= max {
                buffer.push_str(split);
                continue;
            }

            // Can't fit the current split with the existing buffer.
            if !buffer.trim().is_empty() {
                out.push(std::mem::take(&mut buffer));
            } else {
                buffer.clear();
            }

            if char_len(split) <= max {
                buffer.push_str(split);
            } else {
                self.chunk_recursive(split, idx + 1, max, out);
            }
        }

        if !buffer.trim().is_empty() {
            out.push(buffer);
        }
    }
}

impl Default for Recursive {
    fn default() -> Self {
        Self::new(RECURSIVE_DEFAULT_SIZE, RECURSIVE_DEFAULT_OVERLAP)
            .expect("overlap is greater than size")
    }
}

/// Split the input into plain windows of `max` characters.
fn hard_split(input: &str, max: usize, out: &mut Vec<String>) {
    let mut buffer = String::new();
    let mut count = 0;

    for ch in input.chars() {
        buffer.push(ch);
        count += 1;
        if count == max {
            out.push(std::mem::take(&mut buffer));
            count = 0;
        }
    }

    if !buffer.trim().is_empty() {
        out.push(buffer);
    }
}

fn char_len(input: &str) -> usize {
    input.chars().count()
}

/// The trailing `n` characters of the input, or all of it if shorter.
fn char_tail(input: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let start = input
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    input[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "Diabetes mellitus is a group of metabolic disorders characterized by a high blood sugar level over a prolonged period of time. Symptoms often include frequent urination, increased thirst and increased appetite.\n\nIf left untreated, diabetes can cause many health complications. Acute complications can include diabetic ketoacidosis, hyperosmolar hyperglycemic state, or death. Serious long-term complications include cardiovascular disease, stroke, chronic kidney disease, foot ulcers, damage to the nerves, damage to the eyes and cognitive impairment.\n\nDiabetes is due to either the pancreas not producing enough insulin, or the cells of the body not responding properly to the insulin produced.";

    #[test]
    fn chunks_respect_size() {
        let chunker = Recursive::new(100, 20).unwrap();
        let chunks = chunker.chunk(INPUT);

        assert!(chunks.len() > 1);

        for chunk in chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn adjacent_chunks_overlap_exactly() {
        let chunker = Recursive::new(100, 20).unwrap();
        let chunks = chunker.chunk(INPUT);

        assert!(chunks.len() > 1);

        for pair in chunks.windows(2) {
            let tail = char_tail(&pair[0], 20);
            assert_eq!(20, tail.chars().count());
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn short_input_single_chunk() {
        let input = "Aspirin reduces fever.";
        let chunker = Recursive::default();
        let chunks = chunker.chunk(input);

        assert_eq!(vec![input.to_string()], chunks);
    }

    #[test]
    fn empty_input_no_chunks() {
        let chunker = Recursive::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk("  \n\n  ").is_empty());
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let input = "alpha alpha.\n\nbeta beta.\n\ngamma gamma.";
        let chunker = Recursive::new(21, 0).unwrap();
        let chunks = chunker.chunk(input);

        assert_eq!(
            vec![
                "alpha alpha.\n\n".to_string(),
                "beta beta.\n\n".to_string(),
                "gamma gamma.".to_string()
            ],
            chunks
        );
    }

    #[test]
    fn falls_back_to_character_windows() {
        let input = "a".repeat(250);
        let chunker = Recursive::new(100, 20).unwrap();
        let chunks = chunker.chunk(&input);

        assert_eq!(4, chunks.len());
        assert_eq!(80, chunks[0].chars().count());
        assert_eq!(100, chunks[1].chars().count());
        assert_eq!(100, chunks[2].chars().count());
        assert_eq!(30, chunks[3].chars().count());
    }

    #[test]
    fn overlap_must_be_less_than_size() {
        assert!(Recursive::new(10, 10).is_err());
        assert!(Recursive::new(10, 30).is_err());
    }

    #[test]
    fn never_splits_inside_code_points() {
        let input = "é".repeat(250);
        let chunker = Recursive::new(100, 20).unwrap();
        let chunks = chunker.chunk(&input);

        for chunk in chunks {
            assert!(chunk.chars().all(|c| c == 'é'));
            assert!(chunk.chars().count() <= 100);
        }
    }
}
