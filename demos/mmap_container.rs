use matrix_converters::{EmxCodec, SubRegion};
use memmap2::Mmap;
use ndarray::Array2;
use std::fs::File;

/// Zones every matrix in the container is dimensioned for.
const ZONES: usize = 1000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = "emmemat.bin";
    let record_len = (ZONES * ZONES * 4) as u64;

    // Three internal records back to back.
    println!("Writing the container...");
    let mut file = File::create(path)?;
    for k in 0..3 {
        let m = Array2::from_shape_fn((ZONES, ZONES), |(i, j)| (k * 10 + (i + j) % 7) as f32);
        EmxCodec::new().encode(&m, &mut file, k as u64 * record_len)?;
    }
    drop(file);

    // Memory-map it and read the middle record through a window.
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let window = SubRegion::new(&mmap[..], record_len, record_len);
    let m = EmxCodec::new().decode_square::<f32, _>(&window)?;
    println!("record 1 is {}x{}, sum = {}", m.nrows(), m.ncols(), m.sum());
    Ok(())
}
