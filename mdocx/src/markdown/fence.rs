//! Fenced code aggregation
//!
//! A two-state machine: `Normal` passes lines through to the classifier,
//! `InFence` buffers them verbatim. A line whose trimmed form starts with a
//! run of exactly three backticks toggles the state and is never emitted as
//! content.

/// Fence delimiter
const FENCE: &str = "```";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Normal,
    InFence,
}

/// Outcome of feeding one line to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenceEvent<'a> {
    /// Line was a delimiter opening a fence, or was buffered inside one
    Consumed,
    /// Closing delimiter; carries the joined buffer unless the fence was empty
    Closed(Option<String>),
    /// Line is outside any fence
    PassThrough(&'a str),
}

/// Code fence aggregator
#[derive(Debug)]
pub struct CodeFence {
    state: FenceState,
    buffer: Vec<String>,
}

impl Default for CodeFence {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeFence {
    pub fn new() -> Self {
        Self {
            state: FenceState::Normal,
            buffer: Vec::new(),
        }
    }

    /// Whether a fence is currently open
    pub fn is_open(&self) -> bool {
        self.state == FenceState::InFence
    }

    /// Feed the next raw input line
    pub fn feed<'a>(&mut self, line: &'a str) -> FenceEvent<'a> {
        if is_delimiter(line) {
            return match self.state {
                FenceState::Normal => {
                    self.state = FenceState::InFence;
                    FenceEvent::Consumed
                }
                FenceState::InFence => {
                    self.state = FenceState::Normal;
                    FenceEvent::Closed(self.take_buffer())
                }
            };
        }

        match self.state {
            FenceState::InFence => {
                self.buffer.push(line.to_string());
                FenceEvent::Consumed
            }
            FenceState::Normal => FenceEvent::PassThrough(line),
        }
    }

    /// End of input: flush whatever an unterminated fence buffered
    pub fn finish(&mut self) -> Option<String> {
        self.state = FenceState::Normal;
        self.take_buffer()
    }

    fn take_buffer(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let text = self.buffer.join("\n");
        self.buffer.clear();
        Some(text)
    }
}

/// Check whether a line is a fence delimiter (info strings are allowed)
fn is_delimiter(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with(FENCE) && !trimmed[FENCE.len()..].starts_with('`')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_detection() {
        assert!(is_delimiter("```"));
        assert!(is_delimiter("   ```rust"));
        assert!(!is_delimiter("````"));
        assert!(!is_delimiter("``"));
        assert!(!is_delimiter("text ```"));
    }

    #[test]
    fn test_fence_buffers_lines_verbatim() {
        let mut fence = CodeFence::new();

        assert_eq!(fence.feed("```python"), FenceEvent::Consumed);
        assert!(fence.is_open());
        assert_eq!(fence.feed("def f():"), FenceEvent::Consumed);
        assert_eq!(fence.feed("    return 1"), FenceEvent::Consumed);
        assert_eq!(
            fence.feed("```"),
            FenceEvent::Closed(Some("def f():\n    return 1".to_string()))
        );
        assert!(!fence.is_open());
    }

    #[test]
    fn test_empty_fence_emits_nothing() {
        let mut fence = CodeFence::new();

        fence.feed("```");
        assert_eq!(fence.feed("```"), FenceEvent::Closed(None));
    }

    #[test]
    fn test_blank_line_inside_fence_is_kept() {
        let mut fence = CodeFence::new();

        fence.feed("```");
        fence.feed("a");
        fence.feed("");
        fence.feed("b");
        assert_eq!(fence.feed("```"), FenceEvent::Closed(Some("a\n\nb".to_string())));
    }

    #[test]
    fn test_normal_lines_pass_through() {
        let mut fence = CodeFence::new();
        assert_eq!(fence.feed("  # Title"), FenceEvent::PassThrough("  # Title"));
    }

    #[test]
    fn test_finish_flushes_open_fence() {
        let mut fence = CodeFence::new();

        fence.feed("```");
        fence.feed("dangling");
        assert_eq!(fence.finish(), Some("dangling".to_string()));
        assert_eq!(fence.finish(), None);
    }
}
