use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::{self, Write};

pub trait Clipboard: Send {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence.
pub struct Osc52Clipboard<W: Write + Send> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

impl<W: Write + Send> Clipboard for Osc52Clipboard<W> {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.out.write_all(osc52_sequence(text).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records copies; fails every copy when `failing` is set.
    #[derive(Clone, Default)]
    pub struct RecordingClipboard {
        pub copied: Arc<Mutex<Vec<String>>>,
        pub failing: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&mut self, text: &str) -> Result<()> {
            if self.failing {
                anyhow::bail!("clipboard unavailable");
            }
            self.copied.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence_wraps_base64_payload() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_copy_writes_sequence_to_output() {
        let mut clipboard = Osc52Clipboard::new(Vec::new());
        clipboard.copy("<div/>").expect("copy");
        let written = String::from_utf8(clipboard.into_inner()).expect("utf8");
        assert_eq!(written, osc52_sequence("<div/>"));
    }
}
