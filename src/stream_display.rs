//! Stream Display
//!
//! Renders the raw cells of a stream for debugging. Consumed head bits are
//! shown as `+` and unfilled tail bits as `.`.

use std::fmt::Write;

use bitvec::prelude::*;

use crate::bit_stream::{BitStream, CELL_BITS};

// =============================================================================
// Stream Display
// =============================================================================

/// Render every cell as binary, hex bytes, decimal bytes and word value.
pub fn render_stream(stream: &BitStream) -> String {
    let mut out = String::new();

    if stream.cell_count() == 0 {
        out.push_str("<  empty  >\n");
    }

    let last = stream.cell_count().saturating_sub(1);
    for (index, cell) in stream.cells().enumerate() {
        let mut binary = String::with_capacity(CELL_BITS);
        for (pos, bit) in cell.view_bits::<Msb0>().iter().by_vals().enumerate() {
            let consumed = index == 0 && pos < stream.head_offset();
            let unfilled = index == last && stream.tail_fill() > 0 && pos >= stream.tail_fill();
            binary.push(match (consumed, unfilled, bit) {
                (true, _, _) => '+',
                (_, true, _) => '.',
                (_, _, true) => '1',
                (_, _, false) => '0',
            });
        }

        let [hi, lo] = cell.to_be_bytes();
        let _ = writeln!(
            out,
            "{}    0x{:02x} 0x{:02x}    {:>3} {:>3}    {:>5}",
            binary, hi, lo, hi, lo, cell
        );
    }

    let _ = writeln!(out, "SIZE: {} bits / {} cells", stream.size(), stream.cell_count());
    out
}

/// Print the stream dump to stdout.
pub fn display_stream(stream: &BitStream) {
    println!("\n{}", "=".repeat(60));
    println!("BIT STREAM");
    println!("{}", "-".repeat(60));
    print!("{}", render_stream(stream));
    println!("{}\n", "=".repeat(60));
}
