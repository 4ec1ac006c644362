use matrix_converters::{read_mdf, write_mdf, ReadMatrixError, WriteMatrixError, ZoneIndex};
use ndarray::array;
use std::fs::File;

fn write_example() -> Result<(), WriteMatrixError> {
    let zones = ZoneIndex::new(vec![101, 102, 205]).expect("zone identifiers are distinct");
    let demand = array![[0f32, 12.5, 3.], [8., 0., 1.25], [2., 4., 0.]];
    let mut file = File::create("demand.mdf")?;
    write_mdf(&demand, &zones, &mut file)?;
    Ok(())
}

fn read_example() -> Result<(), ReadMatrixError> {
    let file = File::open("demand.mdf")?;
    let (demand, zones) = read_mdf::<f32, _>(&file)?;
    println!("zones = {:?}", zones.as_slice());
    println!("demand =\n{}", demand);
    Ok(())
}

fn main() {
    write_example().expect("failure writing matrix to file");
    read_example().expect("failure reading matrix from file");
}
