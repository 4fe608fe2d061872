//! A streaming reader for [Windows
//! cabinet](https://en.wikipedia.org/wiki/Cabinet_(file_format)) (CAB)
//! archives.
//!
//! The cabinet is consumed front to back in a single pass, so any
//! `io::Read` works as a source; no seeking is required.  Opening a
//! [`Cabinet`] parses the metadata tables, and
//! [`extract`](Cabinet::extract) then walks the data blocks once,
//! asking a [`StreamSaver`] where each file's bytes should go.
//!
//! ```no_run
//! use cabrip::{Cabinet, SingleFileSaver};
//!
//! let file = std::fs::File::open("archive.cab")?;
//! let cabinet = Cabinet::new(file)?;
//! for entry in cabinet.files() {
//!     println!("{} ({} bytes)", entry.name(), entry.uncompressed_size());
//! }
//!
//! let mut saver = SingleFileSaver::new("readme.txt");
//! cabinet.extract(&mut saver)?;
//! if let Some(data) = saver.into_data() {
//!     println!("got {} bytes", data.len());
//! }
//! # Ok::<(), cabrip::CabError>(())
//! ```

#[macro_use]
mod error;

mod block;
mod cabinet;
mod checksum;
mod consts;
mod ctype;
mod datetime;
mod decompress;
mod file;
mod filter;
mod folder;
mod header;
mod mszip;
mod saver;
mod source;
mod string;

pub use crate::cabinet::Cabinet;
pub use crate::ctype::CompressionType;
pub use crate::error::{CabError, Result};
pub use crate::file::{CabFileEntry, FileEntries};
pub use crate::filter::{AcceptAll, FileFilter, NameSetFilter, PatternFilter};
pub use crate::folder::{CabFolderEntry, FolderEntries, FolderEntry};
pub use crate::header::CabHeader;
pub use crate::saver::{
    DirectorySaver, DiscardSaver, FileSink, FilteredSaver, SingleFileSaver,
    StreamSaver,
};
pub use crate::source::CabSource;
