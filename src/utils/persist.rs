use std::{fs::File, io::{BufReader, BufWriter, Read, Write}, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// CBOR persistence for fitted artifacts
/// (vocabulary, collocations, expanded lexicons)
///
/// Every method has a default implementation, implementing types only opt in.
pub trait Persist: Serialize + DeserializeOwned {
    fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        serde_cbor::to_writer(writer, self)?;
        Ok(())
    }

    fn read_from<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_cbor::from_reader(reader)?)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }
}
