use std::io::{self, Write};

const FALLBACK_TERMINAL_WIDTH: usize = 80;

pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .filter(|w| *w > 0)
        .unwrap_or(FALLBACK_TERMINAL_WIDTH)
}

/// Writes `text` to `out`, wrapping each source line independently to `width` columns.
pub fn write_wrapped<W: Write>(out: &mut W, text: &str, width: usize) -> io::Result<()> {
    let width = width.max(1);
    for line in text.split('\n') {
        writeln!(out, "{}", textwrap::fill(line, width))?;
    }
    Ok(())
}

pub fn print_wrapped(text: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_wrapped(&mut handle, text, terminal_width())?;
    handle.flush()
}
