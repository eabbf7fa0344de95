//! Hex/text memory dumps for the debug log.

use log::debug;

const ROW: usize = 16;

/// Render `bytes` as 16-byte rows starting at the row holding `offset`.
///
/// Each row reads `"{addr:04x}h: {hex bytes}\t{text}"`. Whitespace and
/// control characters in the text column show as `.`.
#[must_use]
pub fn lines(bytes: &[u8], offset: usize) -> Vec<String> {
    let start = offset - offset % ROW;
    bytes
        .get(start..)
        .unwrap_or_default()
        .chunks(ROW)
        .enumerate()
        .map(|(i, row)| render_row(start + i * ROW, row))
        .collect()
}

fn render_row(address: usize, row: &[u8]) -> String {
    let mut line = format!("{address:04x}h:");
    line.extend(row.iter().map(|byte| format!(" {byte:02x}")));
    line.push('\t');
    line.extend(row.iter().map(|&byte| {
        let c = char::from(byte);
        if c.is_whitespace() || c.is_control() {
            '.'
        } else {
            c
        }
    }));
    line
}

/// Write a dump of `bytes` from `offset` to the debug log.
pub fn log_memory(bytes: &[u8], offset: usize) {
    for line in lines(bytes, offset) {
        debug!("{line}");
    }
}
