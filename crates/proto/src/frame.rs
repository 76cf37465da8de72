use std::io::{self, Read, Write};

use thiserror::Error;

/// The maximum length prefix we're willing to allocate a buffer for.
///
/// A real client never sends anything close to this; it exists so a
/// corrupted or adversarial length prefix can't be used to make the
/// receiver allocate gigabytes of memory.
const MAX_FRAME_LEN: u32 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("frame length {0} exceeds the maximum allowed frame size")]
    FrameTooLarge(u32),

    #[error("io error while framing: {0}")]
    Io(#[from] io::Error),
}

/// Reads exactly `buf.len()` bytes, looping over short reads.
///
/// A `read` returning `0` means the peer closed the connection; that's
/// reported as [`FrameError::ConnectionClosed`] rather than a generic I/O
/// error so callers can tell a clean disconnect apart from a transient
/// failure.
fn read_exact_loop<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), FrameError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(())
}

/// Writes all of `buf`, looping over short writes.
fn write_all_loop<W: Write>(writer: &mut W, buf: &[u8]) -> Result<(), FrameError> {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => written += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::Io(e)),
        }
    }
    Ok(())
}

/// Reads one length-prefixed frame from `reader`.
///
/// A length prefix of `0` is a legitimate frame (used for "no results"
/// search replies) and yields `Ok(vec![])`.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>, FrameError> {
    let mut len_buf = [0u8; 4];
    read_exact_loop(reader, &mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);

    if len > MAX_FRAME_LEN {
        return Err(FrameError::FrameTooLarge(len));
    }

    let mut payload = vec![0u8; len as usize];
    read_exact_loop(reader, &mut payload)?;
    Ok(payload)
}

/// Writes one length-prefixed frame to `writer`, flushing afterwards.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::FrameTooLarge(u32::MAX))?;
    write_all_loop(writer, &len.to_be_bytes())?;
    write_all_loop(writer, payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_arbitrary_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello world").unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap();
        assert_eq!(decoded, b"hello world");
    }

    #[test]
    fn round_trips_empty_payload() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();

        let mut cursor = Cursor::new(buf);
        let decoded = read_frame(&mut cursor).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn rejects_absurd_length_prefix() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_FRAME_LEN + 1).to_be_bytes());

        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge(_)));
    }

    #[test]
    fn reports_clean_disconnect() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    /// A `Read` impl that only ever yields the data one byte at a time,
    /// to exercise the partial-read loop in `read_exact_loop`.
    struct OneByteAtATime<'a>(&'a [u8]);

    impl<'a> Read for OneByteAtATime<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    #[test]
    fn tolerates_short_reads() {
        let mut full = Vec::new();
        write_frame(&mut full, b"partial reads are not errors").unwrap();

        let mut reader = OneByteAtATime(&full);
        let decoded = read_frame(&mut reader).unwrap();
        assert_eq!(decoded, b"partial reads are not errors");
    }
}
