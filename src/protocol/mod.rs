//! Line-oriented wire protocol
//!
//! ```text
//! <hash>\n
//! <payload bytes, format defined by the selected handler>
//! ```
//!
//! There is no other framing, versioning or length prefix. The hash line and
//! the registrar command line are each capped at [`DEFAULT_MAX_LINE_LEN`]
//! bytes by default.

pub mod command;
pub mod constants;
pub mod line;

pub use command::RegistrarCommand;
pub use constants::{DEFAULT_MAX_LINE_LEN, REGISTRAR_HASH};
pub use line::read_line;
