//! `satz` reads and writes fixed-layout binary records. A record is a struct whose fields are laid out back to back in
//! declaration order, without any framing, padding or length prefixes. How a field appears on wire is determined by
//! its type and a tag:
//!
//! * `-` leaves the field out entirely,
//! * `length:<n>` gives text fields their byte length and sequence fields their element count,
//! * `codec:<encode>:<decode>` hands the field to a pair of functions of the record.
//!
//! Every value of a record type therefore has the same width, see [`Codec::size_of`].
//!
//! # A note on `usize`
//!
//! `usize` and `isize` have no fixed width and do not implement [`Structural`]. Use one of the sized integer types.
//!
//! # A note on Options
//!
//! An absent `Option<T>` is written as `T`-sized zeroes and can not be told apart from a present zero value. Decoding
//! therefore always yields `Some`.
//!
//! # Examples
//!
//! ```
//! use satz::{record, ByteOrder, Codec};
//!
//! record! {
//!     #[derive(Debug, PartialEq)]
//!     struct Greeting {
//!         #[satz("length:4")]
//!         text: String,
//!         #[satz("-, length:4")]
//!         note: String,
//!         count: u8,
//!     }
//! }
//!
//! let codec = Codec::new();
//! let value = Greeting { text: "Hi".to_owned(), note: "ignored".to_owned(), count: 15 };
//! let buf = codec.encode(&value, ByteOrder::LittleEndian).unwrap();
//! assert_eq!(buf, [
//!     0x48, // 'H'
//!     0x69, // 'i'
//!     0x00, // padding
//!     0x00, // padding
//!     0x0f, // count
//! ]);
//! let decoded = codec.decode_new::<Greeting>(&buf, ByteOrder::LittleEndian).unwrap();
//! assert_eq!(Greeting { text: "Hi".to_owned(), note: String::new(), count: 15 }, decoded.0);
//! assert_eq!(5, decoded.1);
//! ```

mod annotation;
mod codec;
mod error;
mod layout;
mod order;
pub mod record;
mod shape;

pub use annotation::*;
pub use codec::*;
pub use error::*;
pub use layout::*;
pub use order::*;
pub use record::{FieldDecl, Record};
pub use shape::*;
