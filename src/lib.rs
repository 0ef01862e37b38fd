//! # xdr-layout
//!
//! XDR (eXternal Data Representation, RFC 4506) size calculation,
//! serialization and deserialization for `serde` types whose structures carry
//! a static field [`Layout`].
//!
//! ## Overview
//!
//! XDR is the wire encoding used by ONC RPC protocols such as NFS. All values
//! are big-endian (network byte order), and every item occupies a multiple of
//! 4 bytes (padded with zeroes as needed).
//!
//! Three passes walk the same value:
//!
//! - [`examine`] computes the exact encoded size and validates the value
//!   against its layout (tags, declared bounds), writing nothing;
//! - [`pack`] examines, then encodes into a buffer of exactly that size;
//! - [`unpack`] decodes untrusted bytes into a destination, enforcing the
//!   same tags and bounds plus buffer length, padding and boolean checks.
//!
//! Each structure field declares which XDR category it is (a [`Tag`]) and,
//! for variable-length data, an optional maximum length. A field whose shape
//! disagrees with its tag is rejected: up front when the field was declared
//! with [`Field::of`], otherwise as soon as its value shows its shape.
//!
//! ## Type mapping
//!
//! | Rust type | XDR encoding | accepted tags |
//! |-----------|--------------|---------------|
//! | `bool` | 4-byte 0 or 1 | Boolean |
//! | `i32` | 4-byte signed int | Integer, Enumeration |
//! | `u32` | 4-byte unsigned int | Unsigned Integer, Enumeration |
//! | `i64` | 8-byte hyper | Hyper Integer |
//! | `u64` | 8-byte unsigned hyper | Unsigned Hyper Integer |
//! | `[u8; N]` | N bytes + 0-3 padding | Fixed-Length Opaque Data |
//! | `[T; N]` | N items | Fixed-Length Array |
//! | `Vec<u8>`, `serde_bytes` | 4-byte length + bytes + 0-3 padding | Variable-Length Opaque Data, String |
//! | `String` | 4-byte length + bytes + 0-3 padding | String |
//! | `Vec<T>` | 4-byte count + items | Variable-Length Array |
//! | struct | fields consecutively | Structure |
//! | `Box<T>`, newtype | as `T` | (those of `T`) |
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use xdr_layout::{Describe, Field, Layout, Tag, examine, pack, unpack};
//!
//! #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
//! struct FileHandle {
//!     inode: u64,
//!     generation: u32,
//!     name: String,
//! }
//!
//! const FILE_HANDLE: Layout = Layout::new(
//!     "FileHandle",
//!     &[
//!         Field::of::<u64>("inode", Tag::UnsignedHyperInteger),
//!         Field::of::<u32>("generation", Tag::UnsignedInteger),
//!         Field::of::<String>("name", Tag::String).max_size(255),
//!     ],
//! );
//!
//! impl Describe for FileHandle {
//!     const LAYOUT: Option<&'static Layout> = Some(&FILE_HANDLE);
//! }
//!
//! let fh = FileHandle { inode: 0x0102030405060708, generation: 42, name: "motd".into() };
//!
//! assert_eq!(examine(&fh).unwrap(), 8 + 4 + 8);
//! let bytes = pack(&fh).unwrap();
//!
//! let mut decoded = FileHandle::default();
//! assert_eq!(unpack(&bytes, &mut decoded).unwrap(), 20);
//! assert_eq!(fh, decoded);
//! ```

pub mod de;
pub mod error;
pub mod fixed_opaque;
pub mod layout;
pub mod ser;
pub mod shape;
pub mod size;

pub use de::{Deserializer, MAX_DEPTH, from_bytes, from_bytes_partial, unpack, unpack_with};
pub use error::{Error, Result};
pub use layout::{Describe, Field, Layout};
pub use ser::{Serializer, pack, pack_with, to_writer};
pub use shape::{Kind, MAX_LENGTH, Tag};
pub use size::{Examiner, examine, examine_with};

pub use serde::{Deserialize, Serialize};

/// Newtype name that marks bytes as fixed-length opaque (no length prefix).
pub(crate) const FIXED_OPAQUE_TOKEN: &str = "$xdr_layout::FixedOpaque";
