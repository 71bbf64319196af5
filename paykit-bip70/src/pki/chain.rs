//! Certificate chain container carried in `pkiData`: repeated tag 1, DER
//! certificates leaf first.

use crate::wire::{WireReader, WireWriter};
use crate::Result;

const CERTIFICATE: u32 = 1;

/// Encode `certs` as a repeated tag-1 list.
///
/// Blobs are carried as-is; whether they parse as certificates is checked
/// when the chain is verified.
pub fn encode_chain<C: AsRef<[u8]>>(certs: &[C]) -> Result<Vec<u8>> {
    let mut writer = WireWriter::new();
    for cert in certs {
        writer.write_field_bytes(CERTIFICATE, cert.as_ref())?;
    }
    Ok(writer.into_bytes())
}

/// Decode a repeated tag-1 list.
pub fn decode_chain(pki_data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut reader = WireReader::new(pki_data).with_context("X509Certificates");
    let certs = reader
        .read_repeated_bytes(CERTIFICATE)?
        .into_iter()
        .map(<[u8]>::to_vec)
        .collect();
    reader.finish()?;
    Ok(certs)
}
