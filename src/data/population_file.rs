use crate::catalog::Catalog;
use crate::engines::generation::Chromosome;
use crate::error::{PhaserError, Result};
use std::fs;
use std::path::Path;

/// Reads one encoded chromosome per line. An empty line is the empty
/// chromosome; a trailing newline does not add one.
pub fn load_population<P: AsRef<Path>>(path: P, catalog: &Catalog) -> Result<Vec<Chromosome>> {
    let contents = fs::read_to_string(path)?;
    parse_population(&contents, catalog)
}

pub fn parse_population(contents: &str, catalog: &Catalog) -> Result<Vec<Chromosome>> {
    contents
        .lines()
        .enumerate()
        .map(|(index, line)| {
            Chromosome::decode(catalog, line).map_err(|e| PhaserError::PopulationFile {
                line: index + 1,
                source: Box::new(e),
            })
        })
        .collect()
}

pub fn save_population<'a, P, I>(path: P, chromosomes: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a Chromosome>,
{
    let mut contents = String::new();
    for chromosome in chromosomes {
        contents.push_str(&chromosome.encode());
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}
