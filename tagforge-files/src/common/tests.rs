use byteorder::{BigEndian, LittleEndian};

use crate::ParserError;
use crate::common::endian;
use crate::common::reader::read_all_chunks;
use crate::common::types::{IffChunk, fourcc, fourcc_str};

#[test]
fn accessor_rejects_out_of_bounds() {
    let mut buf = vec![0u8; 8];
    assert!(endian::write_u32::<LittleEndian>(&mut buf, 4, 7).is_ok());
    assert!(matches!(
        endian::write_u32::<LittleEndian>(&mut buf, 5, 7),
        Err(ParserError::OutOfBounds { offset: 5, size: 4, len: 8 })
    ));
    assert!(endian::read_u16::<BigEndian>(&buf, usize::MAX).is_err());
}

#[test]
fn accessor_respects_byte_order() -> Result<(), anyhow::Error> {
    let mut buf = vec![0u8; 4];
    endian::write_u32::<BigEndian>(&mut buf, 0, 0x11223344)?;
    assert_eq!(buf, vec![0x11, 0x22, 0x33, 0x44]);
    assert_eq!(endian::read_u32::<LittleEndian>(&buf, 0)?, 0x44332211);
    Ok(())
}

#[test]
fn fixed_strings() -> Result<(), anyhow::Error> {
    let mut buf = vec![0xFFu8; 8];
    endian::write_fixed_string(&mut buf, 0, 8, "abc")?;
    assert_eq!(&buf[..4], b"abc\0");
    assert_eq!(endian::read_fixed_string(&buf, 0, 8)?, "abc");
    assert!(endian::write_fixed_string(&mut buf, 0, 8, "12345678").is_err());
    Ok(())
}

#[test]
fn chunks_until_eof() -> Result<(), anyhow::Error> {
    let mut buf = Vec::new();
    IffChunk::new(fourcc(b"DATA"), vec![1, 2, 3]).write(&mut buf)?;
    IffChunk::new(fourcc(b"ASST"), vec![]).write(&mut buf)?;

    let chunks = read_all_chunks(&mut buf.as_slice())?;
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].magic_str(), "DATA");
    assert_eq!(chunks[0].data, vec![1, 2, 3]);
    assert_eq!(fourcc_str(chunks[1].magic), "ASST");
    Ok(())
}

#[test]
fn align() {
    assert_eq!(endian::align4(0), 0);
    assert_eq!(endian::align4(1), 4);
    assert_eq!(endian::align4(8), 8);
}
