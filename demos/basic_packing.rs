//! Simple packing example
//!
//! This example writes a small game-state update field by field, prints the
//! dense frame, and reads the fields back in the same order.

use densebits::{BitStream, Frame, StreamConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = BitStream::new();

    // Write the update; the order defines the wire layout
    stream.write_int(3u32)?;                        // player id
    stream.write_string("Apokaliptic tests", false)?; // player name
    stream.write_flag(true);                        // is alive
    stream.write_float(0.771);                      // health ratio
    stream.write_u4(0x0C);                          // team
    stream.write_int(4_294_967_296u64)?;            // score, too wide for u32

    let frame = Frame::from_stream(&stream);
    println!("Encoded {} bits ({} bytes)", frame.bits, frame.bits.div_ceil(8));
    println!("Frame:\n{}", frame.to_json()?);

    // Rebuild the stream as a receiver would and read everything back
    let mut received = frame.into_stream(&StreamConfig::strict())?;
    println!("\n=== Decoded ===");
    println!("Player id: {}", received.read_int()?);
    println!("Name:      {}", received.read_string()?);
    println!("Alive:     {}", received.read_flag()?);
    println!("Health:    {:.3}", received.read_float()?);
    println!("Team:      {}", received.read_u4()?);
    println!("Score:     {}", received.read_int()?);
    println!("Bits left: {}", received.size());

    Ok(())
}
