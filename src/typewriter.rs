//! Typing effect for assistant output
//!
//! AI-kind records are replayed one character per interval with a block
//! cursor until fully revealed. The reveal is a pure function of elapsed
//! time, so the render loop can sample it at any rate.

use std::time::{Duration, Instant};

pub const CURSOR: char = '█';

#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset after each character
    ends: Vec<usize>,
    interval: Duration,
    started: Instant,
    skipped: bool,
}

impl Typewriter {
    pub fn new(text: &str, interval: Duration) -> Self {
        Self::started_at(text, interval, Instant::now())
    }

    pub fn started_at(text: &str, interval: Duration, started: Instant) -> Self {
        let ends = text.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        Self {
            text: text.to_string(),
            ends,
            interval,
            started,
            skipped: false,
        }
    }

    /// Characters revealed after `elapsed`
    pub fn revealed_at(&self, elapsed: Duration) -> usize {
        if self.skipped || self.interval.is_zero() {
            return self.ends.len();
        }
        let steps = elapsed.as_nanos() / self.interval.as_nanos();
        (steps.min(self.ends.len() as u128)) as usize
    }

    /// Visible prefix after `elapsed`
    pub fn visible_at(&self, elapsed: Duration) -> &str {
        match self.revealed_at(elapsed) {
            0 => "",
            n => &self.text[..self.ends[n - 1]],
        }
    }

    pub fn visible(&self) -> &str {
        self.visible_at(self.started.elapsed())
    }

    pub fn is_done_at(&self, elapsed: Duration) -> bool {
        self.revealed_at(elapsed) == self.ends.len()
    }

    pub fn is_done(&self) -> bool {
        self.is_done_at(self.started.elapsed())
    }

    /// Reveal everything immediately
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// Visible text with the cursor appended while typing
    pub fn frame(&self) -> String {
        let mut frame = self.visible().to_string();
        if !self.is_done() {
            frame.push(CURSOR);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(20);

    #[test]
    fn test_reveals_one_char_per_interval() {
        let tw = Typewriter::new("hello", TICK);
        assert_eq!(tw.visible_at(Duration::ZERO), "");
        assert_eq!(tw.visible_at(TICK), "h");
        assert_eq!(tw.visible_at(TICK * 3 + Duration::from_millis(5)), "hel");
        assert_eq!(tw.visible_at(TICK * 50), "hello");
        assert!(tw.is_done_at(TICK * 5));
        assert!(!tw.is_done_at(TICK * 4));
    }

    #[test]
    fn test_multibyte_boundaries() {
        let tw = Typewriter::new("🤖 hi", TICK);
        assert_eq!(tw.visible_at(TICK), "🤖");
        assert_eq!(tw.visible_at(TICK * 2), "🤖 ");
    }

    #[test]
    fn test_zero_interval_and_skip_show_everything() {
        let instant = Typewriter::new("abc", Duration::ZERO);
        assert_eq!(instant.visible_at(Duration::ZERO), "abc");

        let mut slow = Typewriter::new("abc", Duration::from_secs(60));
        assert!(slow.frame().ends_with(CURSOR));
        slow.skip();
        assert_eq!(slow.frame(), "abc");
    }

    #[test]
    fn test_empty_text_is_done() {
        let tw = Typewriter::new("", TICK);
        assert!(tw.is_done_at(Duration::ZERO));
        assert_eq!(tw.visible_at(TICK), "");
    }
}
