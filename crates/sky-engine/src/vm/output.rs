//! Output sinks for `print` and the instruction trace

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// An in-memory sink that can be handed to the VM and read back afterwards.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Rc<RefCell<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.bytes.borrow_mut().clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_buffer() {
        let buffer = CaptureBuffer::new();
        let mut writer = buffer.clone();
        writeln!(writer, "hello").unwrap();
        assert_eq!(buffer.contents(), "hello\n");
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }
}
