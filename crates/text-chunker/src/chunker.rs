use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::types::Chunk;

/// Fixed-window text chunker
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting configurations that cannot advance
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split text into overlapping windows.
    ///
    /// Windows hold `target_size` characters and start `target_size - overlap`
    /// characters apart; the last one holds whatever remains. Empty text yields
    /// no windows, text shorter than a window yields exactly one.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char start plus the end of the string.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        let target = self.config.target_size;
        let stride = self.config.stride();
        let mut windows = Vec::with_capacity(total / stride + 1);
        let mut start = 0;

        loop {
            let end = (start + target).min(total);
            windows.push(text[bounds[start]..bounds[end]].to_string());
            if end == total {
                break;
            }
            start += stride;
        }

        windows
    }

    /// Split one document and attach its attribution.
    #[must_use]
    pub fn chunk_document(&self, source: &str, text: &str) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = self
            .split(text)
            .into_iter()
            .enumerate()
            .map(|(chunk_id, window)| Chunk::new(source, chunk_id, window))
            .collect();
        log::debug!("Chunked {source} into {} windows", chunks.len());
        chunks
    }
}

/// One-shot form of [`Chunker::split`].
pub fn chunk(text: &str, target_size: usize, overlap: usize) -> Result<Vec<String>> {
    let chunker = Chunker::new(ChunkerConfig::new(target_size, overlap))?;
    Ok(chunker.split(text))
}

/// Rebuild the original text from consecutive windows by dropping the leading
/// `overlap` characters of every window after the first.
#[must_use]
pub fn reassemble<S: AsRef<str>>(windows: &[S], overlap: usize) -> String {
    let mut out = String::new();
    for (idx, window) in windows.iter().enumerate() {
        let window = window.as_ref();
        if idx == 0 {
            out.push_str(window);
        } else {
            out.extend(window.chars().skip(overlap));
        }
    }
    out
}
