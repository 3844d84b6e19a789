//! Binary layout of the copy listing.
//!
//! A listing starts with a fixed header followed by one record per object:
//!
//! ```text
//! header: b"RLST" | version: u16
//! record: path_len: u32 | path: [u8; path_len] (UTF-8) | byte_length: u64
//! ```
//!
//! All integers are big-endian. Records are read strictly in storage order,
//! the offset of a record is what [`Split`] ranges refer to.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::bail;
use crate::error::{ErrorKind, ReplicaResult};
use crate::listing::entry::{ListingEntry, ListingSummary, Split};
use crate::replica_error;

const LISTING_MAGIC: &[u8; 4] = b"RLST";
const LISTING_VERSION: u16 = 1;

/// Size of the listing header, the offset of the first record.
pub const LISTING_HEADER_BYTES: u64 = 6;

/// Writes a listing record by record.
#[derive(Debug)]
pub struct ListingWriter<W> {
    writer: W,
    position: u64,
    summary: ListingSummary,
}

impl ListingWriter<BufWriter<File>> {
    /// Creates (or truncates) the listing file at `path`.
    pub fn create(path: &Path) -> ReplicaResult<Self> {
        let file = File::create(path)?;
        ListingWriter::new(BufWriter::new(file))
    }
}

impl<W: Write> ListingWriter<W> {
    pub fn new(mut writer: W) -> ReplicaResult<Self> {
        writer.write_all(LISTING_MAGIC)?;
        writer.write_u16::<BigEndian>(LISTING_VERSION)?;

        Ok(Self {
            writer,
            position: LISTING_HEADER_BYTES,
            summary: ListingSummary::default(),
        })
    }

    /// Appends an object and returns the entry as it will be read back.
    pub fn append(&mut self, relative_path: &str, byte_length: u64) -> ReplicaResult<ListingEntry> {
        let path_len = u32::try_from(relative_path.len()).map_err(|_| {
            replica_error!(
                ErrorKind::InvalidData,
                "Listing path is too long",
                relative_path.len()
            )
        })?;

        self.writer.write_u32::<BigEndian>(path_len)?;
        self.writer.write_all(relative_path.as_bytes())?;
        self.writer.write_u64::<BigEndian>(byte_length)?;

        let entry = ListingEntry {
            relative_path: relative_path.to_owned(),
            byte_length,
            sequence_position: self.position,
        };

        self.position += 4 + u64::from(path_len) + 8;
        self.summary.entries += 1;
        self.summary.total_bytes += byte_length;

        Ok(entry)
    }

    /// Flushes the listing and returns its totals.
    pub fn finish(mut self) -> ReplicaResult<ListingSummary> {
        self.writer.flush()?;

        Ok(self.summary)
    }
}

/// Streams the entries of a listing in storage order.
#[derive(Debug)]
pub struct ListingReader<R> {
    reader: R,
    position: u64,
}

impl ListingReader<BufReader<File>> {
    /// Opens the listing file at `path`.
    ///
    /// A missing or unreadable file is a configuration error, nothing can be
    /// planned without a listing.
    pub fn open(path: &Path) -> ReplicaResult<Self> {
        let file = File::open(path).map_err(|err| {
            replica_error!(
                ErrorKind::ConfigError,
                "Could not open the listing file",
                format!("{}: {err}", path.display())
            )
        })?;

        ListingReader::new(BufReader::new(file))
    }
}

impl<R: Read> ListingReader<R> {
    /// Wraps `reader` after validating the listing header.
    pub fn new(mut reader: R) -> ReplicaResult<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|err| {
            replica_error!(
                ErrorKind::ListingCorrupted,
                "Listing header is truncated",
                err
            )
        })?;
        if &magic != LISTING_MAGIC {
            bail!(
                ErrorKind::ListingCorrupted,
                "Listing header has an invalid magic"
            );
        }

        let version = reader.read_u16::<BigEndian>().map_err(|err| {
            replica_error!(
                ErrorKind::ListingCorrupted,
                "Listing header is truncated",
                err
            )
        })?;
        if version != LISTING_VERSION {
            bail!(
                ErrorKind::ListingCorrupted,
                "Unsupported listing version",
                version
            );
        }

        Ok(Self {
            reader,
            position: LISTING_HEADER_BYTES,
        })
    }

    /// Offset of the next record to be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next entry, `None` once the listing is exhausted.
    pub fn next_entry(&mut self) -> ReplicaResult<Option<ListingEntry>> {
        let sequence_position = self.position;

        let mut len_bytes = [0u8; 4];
        if !read_or_eof(&mut self.reader, &mut len_bytes)? {
            return Ok(None);
        }
        let path_len = u32::from_be_bytes(len_bytes);

        let mut path = vec![0u8; path_len as usize];
        self.reader
            .read_exact(&mut path)
            .map_err(|err| truncated_record(sequence_position, err))?;
        let relative_path = String::from_utf8(path).map_err(|err| {
            replica_error!(
                ErrorKind::ListingCorrupted,
                "Listing path is not valid UTF-8",
                format!("record at offset {sequence_position}: {err}")
            )
        })?;

        let byte_length = self
            .reader
            .read_u64::<BigEndian>()
            .map_err(|err| truncated_record(sequence_position, err))?;

        self.position += 4 + u64::from(path_len) + 8;

        Ok(Some(ListingEntry {
            relative_path,
            byte_length,
            sequence_position,
        }))
    }
}

impl<R: Read + Seek> ListingReader<R> {
    /// Moves to `offset`, which must be the start of a record.
    pub fn seek_to(&mut self, offset: u64) -> ReplicaResult<()> {
        if offset < LISTING_HEADER_BYTES {
            bail!(
                ErrorKind::InvalidData,
                "Offset points inside the listing header",
                offset
            );
        }

        self.reader.seek(SeekFrom::Start(offset))?;
        self.position = offset;

        Ok(())
    }

    /// Reads exactly the entries covered by `split`.
    pub fn read_split(&mut self, split: &Split) -> ReplicaResult<Vec<ListingEntry>> {
        let Some(end_offset) = split.end_offset() else {
            bail!(
                ErrorKind::InvalidData,
                "Split range overflows the listing offsets",
                format!("{split:?}")
            );
        };

        self.seek_to(split.start_offset)?;

        let mut entries = Vec::new();
        while self.position < end_offset {
            let Some(entry) = self.next_entry()? else {
                bail!(
                    ErrorKind::ListingCorrupted,
                    "Listing ended before the end of the split",
                    format!("{split:?}")
                );
            };
            entries.push(entry);
        }

        if self.position != end_offset {
            bail!(
                ErrorKind::InvalidData,
                "Split does not end on a record boundary",
                format!("{split:?}")
            );
        }

        Ok(entries)
    }
}

/// Fills `buf` completely, returning `false` on a clean end of stream before
/// the first byte.
fn read_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> ReplicaResult<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                bail!(
                    ErrorKind::ListingCorrupted,
                    "Listing record header is truncated"
                );
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }

    Ok(true)
}

fn truncated_record(offset: u64, err: io::Error) -> crate::error::ReplicaError {
    replica_error!(
        ErrorKind::ListingCorrupted,
        "Listing record is truncated",
        format!("record at offset {offset}: {err}")
    )
}
