//! Opening archives and walking their entries, one reader per format.

use crate::error::{Result, UnarchiveError};
use crate::scanner::{ArchiveFile, ArchiveKind};
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

/// Bytes inspected to tell a compressed tarball from a single compressed file.
const TAR_BLOCK_SIZE: u64 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// What an archive stores about one entry, before it is written anywhere.
#[derive(Debug, Clone)]
pub struct EntryHeader {
    /// Path as stored in the archive, not yet sanitized.
    pub path: PathBuf,
    pub kind: EntryKind,
    pub mode: Option<u32>,
}

/// Callback receiving each entry header and its decompressed bytes.
pub type EntryVisitor<'a> = dyn FnMut(&EntryHeader, &mut dyn Read) -> Result<()> + 'a;

pub enum OpenedArchive {
    Zip(zip::ZipArchive<BufReader<File>>),
    SevenZip(sevenz_rust2::ArchiveReader<File>),
    Rar(unrar::OpenArchive<unrar::Process, unrar::CursorBeforeHeader>),
    Tar(tar::Archive<Box<dyn Read>>),
    Stream {
        entry_name: PathBuf,
        reader: Box<dyn Read>,
    },
}

/// Opens `archive` with the reader matching its kind.
pub fn open_archive(archive: &ArchiveFile) -> Result<OpenedArchive> {
    let path = archive.path.as_path();
    tracing::debug!(archive = %archive.name, kind = %archive.kind, "opening archive");

    match archive.kind {
        ArchiveKind::Zip => {
            let file = File::open(path).map_err(|e| UnarchiveError::open(path, e))?;
            let zip = zip::ZipArchive::new(BufReader::new(file))
                .map_err(|e| UnarchiveError::open(path, e))?;
            Ok(OpenedArchive::Zip(zip))
        }
        ArchiveKind::SevenZip => {
            let file = File::open(path).map_err(|e| UnarchiveError::open(path, e))?;
            let reader = sevenz_rust2::ArchiveReader::new(file, sevenz_rust2::Password::empty())
                .map_err(|e| UnarchiveError::open(path, e))?;
            Ok(OpenedArchive::SevenZip(reader))
        }
        ArchiveKind::Rar => {
            let rar = unrar::Archive::new(path)
                .open_for_processing()
                .map_err(|e| UnarchiveError::open(path, e))?;
            Ok(OpenedArchive::Rar(rar))
        }
        ArchiveKind::Tar => {
            let file = File::open(path).map_err(|e| UnarchiveError::open(path, e))?;
            let (is_tar, reader) = sniff_tar_header(path, Box::new(BufReader::new(file)))?;
            if !is_tar {
                return Err(UnarchiveError::open(path, "missing tar header"));
            }
            Ok(OpenedArchive::Tar(tar::Archive::new(reader)))
        }
        ArchiveKind::Gzip | ArchiveKind::Bzip2 | ArchiveKind::Xz => {
            let file = File::open(path).map_err(|e| UnarchiveError::open(path, e))?;
            let decoder = decoder_for(archive.kind, BufReader::new(file));
            open_compressed_stream(path, decoder, PathBuf::from(archive.stem()))
        }
    }
}

fn decoder_for(kind: ArchiveKind, reader: BufReader<File>) -> Box<dyn Read> {
    match kind {
        ArchiveKind::Bzip2 => Box::new(bzip2::read::BzDecoder::new(reader)),
        ArchiveKind::Xz => Box::new(xz2::read::XzDecoder::new(reader)),
        _ => Box::new(flate2::read::MultiGzDecoder::new(reader)),
    }
}

/// Reads the first block and hands back a reader that still starts at byte 0.
fn sniff_tar_header(path: &Path, mut reader: Box<dyn Read>) -> Result<(bool, Box<dyn Read>)> {
    let mut head = Vec::with_capacity(TAR_BLOCK_SIZE as usize);
    reader
        .by_ref()
        .take(TAR_BLOCK_SIZE)
        .read_to_end(&mut head)
        .map_err(|e| UnarchiveError::open(path, e))?;

    let is_tar = looks_like_tar(&head);
    Ok((is_tar, Box::new(Cursor::new(head).chain(reader))))
}

/// Peeks at the first decompressed block: a tar header means a compressed
/// tarball, anything else is a single file named `entry_name`.
fn open_compressed_stream(
    path: &Path,
    decoder: Box<dyn Read>,
    entry_name: PathBuf,
) -> Result<OpenedArchive> {
    let (is_tar, reader) = sniff_tar_header(path, decoder)?;

    if is_tar {
        tracing::debug!(archive = %path.display(), "compressed tarball");
        Ok(OpenedArchive::Tar(tar::Archive::new(reader)))
    } else {
        Ok(OpenedArchive::Stream { entry_name, reader })
    }
}

fn looks_like_tar(block: &[u8]) -> bool {
    block.len() >= 262 && &block[257..262] == b"ustar"
}

impl OpenedArchive {
    /// Calls `visit` for every entry in the order the format stores them.
    /// Stops at the first error, from the reader or from `visit`.
    pub fn for_each_entry(self, source: &Path, visit: &mut EntryVisitor<'_>) -> Result<()> {
        match self {
            OpenedArchive::Zip(mut zip) => {
                for index in 0..zip.len() {
                    let mut file = zip.by_index(index).map_err(|e| UnarchiveError::StreamOpen {
                        entry: format!("{}#{}", source.display(), index),
                        message: e.to_string(),
                    })?;

                    let header = EntryHeader {
                        path: PathBuf::from(file.name()),
                        kind: if file.is_dir() {
                            EntryKind::Directory
                        } else {
                            EntryKind::File
                        },
                        mode: file.unix_mode(),
                    };
                    visit(&header, &mut file)?;
                }
                Ok(())
            }
            OpenedArchive::SevenZip(mut reader) => {
                let mut failure: Option<UnarchiveError> = None;

                // Returning false only ends the current block, so later calls
                // must bail out on their own once a failure is recorded.
                let walked = reader.for_each_entries(|entry, data| {
                    if failure.is_some() {
                        return Ok(false);
                    }

                    let header = EntryHeader {
                        path: PathBuf::from(entry.name()),
                        kind: if entry.is_directory() {
                            EntryKind::Directory
                        } else {
                            EntryKind::File
                        },
                        mode: seven_zip_unix_mode(
                            entry.has_windows_attributes,
                            entry.windows_attributes,
                        ),
                    };

                    match visit(&header, data) {
                        Ok(()) => Ok(true),
                        Err(e) => {
                            failure = Some(e);
                            Ok(false)
                        }
                    }
                });

                if let Some(error) = failure {
                    return Err(error);
                }
                walked.map_err(|e| UnarchiveError::stream_open(source.display(), e))
            }
            OpenedArchive::Rar(mut cursor) => {
                loop {
                    let next_header = cursor
                        .read_header()
                        .map_err(|e| UnarchiveError::stream_open(source.display(), e))?;
                    let current = match next_header {
                        Some(current) => current,
                        None => return Ok(()),
                    };

                    let stored = current.entry();
                    let header = EntryHeader {
                        path: stored.filename.clone(),
                        kind: if stored.is_directory() {
                            EntryKind::Directory
                        } else {
                            EntryKind::File
                        },
                        mode: None,
                    };

                    cursor = match header.kind {
                        EntryKind::Directory => {
                            visit(&header, &mut io::empty())?;
                            current
                                .skip()
                                .map_err(|e| UnarchiveError::stream_open(header.path.display(), e))?
                        }
                        EntryKind::File => {
                            let (data, next) = current.read().map_err(|e| {
                                UnarchiveError::stream_open(header.path.display(), e)
                            })?;
                            visit(&header, &mut data.as_slice())?;
                            next
                        }
                    };
                }
            }
            OpenedArchive::Tar(mut archive) => {
                let entries = archive
                    .entries()
                    .map_err(|e| UnarchiveError::open(source, e))?;

                for entry in entries {
                    let mut entry = entry.map_err(|e| UnarchiveError::StreamOpen {
                        entry: source.display().to_string(),
                        message: e.to_string(),
                    })?;

                    let path = entry
                        .path()
                        .map_err(|e| UnarchiveError::StreamOpen {
                            entry: source.display().to_string(),
                            message: e.to_string(),
                        })?
                        .into_owned();

                    let entry_type = entry.header().entry_type();
                    let kind = if entry_type.is_dir() {
                        EntryKind::Directory
                    } else if entry_type.is_file() {
                        EntryKind::File
                    } else {
                        tracing::debug!(
                            entry = %path.display(),
                            ?entry_type,
                            "skipping special tar entry"
                        );
                        continue;
                    };

                    let header = EntryHeader {
                        path,
                        kind,
                        mode: entry.header().mode().ok(),
                    };
                    visit(&header, &mut entry)?;
                }
                Ok(())
            }
            OpenedArchive::Stream {
                entry_name,
                mut reader,
            } => {
                let header = EntryHeader {
                    path: entry_name,
                    kind: EntryKind::File,
                    mode: None,
                };
                visit(&header, &mut reader)
            }
        }
    }

    /// Unpacks everything into `dest` with the format library's own
    /// whole-archive routine.
    pub fn unpack_into(self, source: &Path, dest: &Path) -> Result<()> {
        match self {
            OpenedArchive::Zip(mut zip) => zip
                .extract(dest)
                .map_err(|e| UnarchiveError::extract(source, e)),
            OpenedArchive::SevenZip(reader) => {
                // The reader only validated the header; the bulk routine reopens by path.
                drop(reader);
                sevenz_rust2::decompress_file(source, dest)
                    .map_err(|e| UnarchiveError::extract(source, e))
            }
            OpenedArchive::Rar(mut cursor) => {
                while let Some(current) = cursor
                    .read_header()
                    .map_err(|e| UnarchiveError::extract(source, e))?
                {
                    cursor = current
                        .extract_with_base(dest)
                        .map_err(|e| UnarchiveError::extract(source, e))?;
                }
                Ok(())
            }
            OpenedArchive::Tar(mut archive) => archive
                .unpack(dest)
                .map_err(|e| UnarchiveError::extract(source, e)),
            OpenedArchive::Stream {
                entry_name,
                mut reader,
            } => {
                let mut out = File::create(dest.join(&entry_name))
                    .map_err(|e| UnarchiveError::extract(source, e))?;
                io::copy(&mut reader, &mut out)
                    .map(|_| ())
                    .map_err(|e| UnarchiveError::extract(source, e))
            }
        }
    }
}

/// 7z keeps unix permissions in the high 16 bits of the windows attributes
/// when the 0x8000 extension flag is set.
fn seven_zip_unix_mode(has_attributes: bool, attributes: u32) -> Option<u32> {
    const UNIX_EXTENSION: u32 = 0x8000;

    if has_attributes && attributes & UNIX_EXTENSION != 0 {
        Some(attributes >> 16)
    } else {
        None
    }
}
