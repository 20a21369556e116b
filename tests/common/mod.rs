use rand::Rng;
use std::fs::File;
use std::io::Error;
use std::path::Path;

/// Writes an `op,arg` replay file.
pub fn write_ops(path: &Path, ops: &[(&str, &str)]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "arg"])?;
    for (op, arg) in ops {
        wtr.write_record([op, arg])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a replay file that initialises `coins` eights and then pays 1 per row
/// until the wallet is empty.
pub fn generate_drain(path: &Path, coins: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(["op", "arg"])?;

    let init = vec!["8"; coins].join(" ");
    wtr.write_record(["init", init.as_str()])?;
    for _ in 0..coins * 8 {
        wtr.write_record(["pay", "1"])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Random coin values within the default denomination range.
pub fn random_coins<R: Rng>(rng: &mut R, len: usize) -> Vec<i64> {
    (0..len).map(|_| rng.gen_range(1..=8)).collect()
}
