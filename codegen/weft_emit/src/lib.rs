//! Code-emission sink
//!
//! Abstraction for instruction output during codec generation. The
//! generator only ever sees this trait; the concrete rendering (in-memory
//! text, files, anything else) is the caller's concern.
//!
//! Block structure is part of the emitted language: `open_block` starts a
//! nested scope under a header line and `close_block` ends it. Sinks are
//! required to keep the two balanced; [`StringSink`] tracks the depth and
//! renders nesting as indentation.

/// Trait for emitting generated codec instructions.
pub trait Sink {
    /// Emit one instruction line at the current nesting depth.
    fn write_line(&mut self, line: &str);

    /// Emit `header` and open a nested scope under it.
    fn open_block(&mut self, header: &str);

    /// Close the innermost open scope.
    fn close_block(&mut self);
}

/// String-based sink rendering block nesting as 4-space indentation.
///
/// This is the primary sink for in-memory generation and for the runtime,
/// whose program parser reads the indentation discipline back.
#[derive(Default)]
pub struct StringSink {
    buffer: String,
    depth: usize,
}

/// Indentation width per block level.
pub const INDENT: usize = 4;

impl StringSink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
            depth: 0,
        }
    }

    /// Current buffer contents without consuming.
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Current block nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consume the sink and return the emitted text.
    ///
    /// Panics in debug builds if any block is still open; the generator
    /// closes every block it opens.
    pub fn finish(self) -> String {
        debug_assert_eq!(self.depth, 0, "unbalanced open_block/close_block");
        self.buffer
    }

    fn indent(&mut self) {
        for _ in 0..self.depth * INDENT {
            self.buffer.push(' ');
        }
    }
}

impl Sink for StringSink {
    fn write_line(&mut self, line: &str) {
        self.indent();
        self.buffer.push_str(line);
        self.buffer.push('\n');
    }

    fn open_block(&mut self, header: &str) {
        self.write_line(header);
        self.depth += 1;
    }

    fn close_block(&mut self) {
        debug_assert!(self.depth > 0, "close_block without open_block");
        self.depth = self.depth.saturating_sub(1);
    }
}
