use std::io::{self, Write};

/// Writes `text` to stdout; a closed pipe (`payintensity ... | head`) is not an error.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_stdout(text.as_bytes(), false)
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_stdout(text.as_bytes(), true)
}

fn write_stdout(bytes: &[u8], newline: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    ignore_broken_pipe(write_and_flush(&mut stdout, bytes, newline))
}

fn write_and_flush(writer: &mut impl Write, bytes: &[u8], newline: bool) -> io::Result<()> {
    writer.write_all(bytes)?;
    if newline {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

fn ignore_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::ignore_broken_pipe;

    #[test]
    fn broken_pipe_is_swallowed_but_other_errors_are_not() {
        let broken = ignore_broken_pipe(Err(io::Error::from(io::ErrorKind::BrokenPipe)));
        assert!(broken.is_ok());

        let denied = ignore_broken_pipe(Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(denied.is_err());
    }
}
