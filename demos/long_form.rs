use matrix_converters::{cells, matrix_from_cells, FortranCodec, LabeledCell, ZoneIndex};
use ndarray::array;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let zones = ZoneIndex::new(vec![1, 2, 3])?;
    let skim = array![[0f32, 5.5, 9.], [5.5, 0., 4.], [9., 4., 0.]];

    // Dense to (origin, destination, value) triples.
    for LabeledCell {
        origin,
        destination,
        value,
    } in cells(&skim, &zones)?
    {
        println!("{}\t{}\t{}", origin, destination, value);
    }

    // Sparse triples back to a dense matrix; missing pairs are zero.
    let trips = vec![
        LabeledCell { origin: 1, destination: 3, value: 120f32 },
        LabeledCell { origin: 3, destination: 2, value: 45. },
    ];
    let dense = matrix_from_cells(trips, &zones)?;
    println!("trips =\n{}", dense);

    // Hand the dense matrix to a legacy FORTRAN model.
    let mut file = std::fs::File::create("trips.bin")?;
    FortranCodec::davidson().encode(&dense, &mut file)?;
    Ok(())
}
