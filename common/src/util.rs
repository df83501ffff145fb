use std::{ffi::CString, io};

#[cfg(windows)]
use windows::{core::PCSTR, Win32::System::Diagnostics::Debug::OutputDebugStringA};

pub trait AsCString {
    fn as_c_string(&self) -> CString;
}

impl AsCString for String {
    fn as_c_string(&self) -> CString {
        self.as_str().as_c_string()
    }
}

impl AsCString for &str {
    fn as_c_string(&self) -> CString {
        // Interior NULs would truncate the string on the C side anyway.
        CString::new(self.replace('\0', "")).unwrap_or_default()
    }
}

/// Null-terminated UTF-16 for the wide Win32 calls.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16()
        .filter(|&unit| unit != 0)
        .chain(std::iter::once(0))
        .collect()
}

/// Text of a wide Win32 buffer up to its first NUL.
pub fn from_wide(buffer: &[u16]) -> String {
    let end = buffer
        .iter()
        .position(|&unit| unit == 0)
        .unwrap_or(buffer.len());
    String::from_utf16_lossy(&buffer[..end])
}

/// Low-order word of a message parameter, e.g. the control id of a `WM_COMMAND`.
pub fn low_word(value: usize) -> u16 {
    (value & 0xffff) as u16
}

#[cfg(windows)]
pub fn print_debug_string(s: &str) {
    if cfg!(debug_assertions) {
        let message = s.as_c_string();
        unsafe {
            OutputDebugStringA(PCSTR(message.as_ptr() as _));
        }
    }
}

// No debugger output channel elsewhere.
#[cfg(not(windows))]
pub fn print_debug_string(s: &str) {
    eprint!("{s}");
}

/// Sink for the log subscriber. Every formatted line ends up in the debugger output.
#[derive(Clone, Copy, Debug, Default)]
pub struct DebugStringWriter;

impl io::Write for DebugStringWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        print_debug_string(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn init_logging() {
    let max_level = if cfg!(debug_assertions) {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // A second call finds a global subscriber already installed, which is fine.
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_ansi(false)
        .with_target(false)
        .with_writer(|| DebugStringWriter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn c_string_drops_interior_nul() {
        assert_eq!("Ad\0a".as_c_string().as_bytes(), b"Ada");
        assert_eq!(String::from("Say Hello").as_c_string().as_bytes(), b"Say Hello");
    }

    #[test]
    fn wide_text_keeps_non_ascii_name() {
        // "José" as an edit control hands it back, with spare room after the NUL.
        let buffer: [u16; 6] = [0x4A, 0x6F, 0x73, 0xE9, 0, 0x41];
        let name = from_wide(&buffer);
        assert_eq!(name, "José");

        let text = to_wide(&crate::form::greeting(&name));
        let expected: Vec<u16> = "Hello, José!\0".encode_utf16().collect();
        assert_eq!(text, expected);
        assert!(text.contains(&0xE9));
    }

    #[test]
    fn wide_text_is_nul_terminated_once() {
        assert_eq!(to_wide(""), vec![0]);
        assert_eq!(to_wide("A\0B"), vec![0x41, 0x42, 0]);
        assert_eq!(from_wide(&[0x41, 0x42]), "AB");
    }

    #[test]
    fn low_word_extracts_command_id() {
        // EN_CHANGE (0x0300) in the high word, control id 101 in the low word.
        assert_eq!(low_word(0x0300_0065), 101);
        assert_eq!(low_word(102), 102);
    }

    #[test]
    fn debug_writer_consumes_whole_buffer() {
        let mut writer = DebugStringWriter;
        assert_eq!(writer.write(b"line\n").unwrap(), 5);
        assert!(writer.flush().is_ok());
    }

    #[test]
    fn init_logging_twice_is_harmless() {
        init_logging();
        init_logging();
        tracing::debug!("logging initialised");
    }
}
