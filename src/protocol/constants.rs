//! Wire protocol constants

/// Cap on the hash line and the registrar command line
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

/// Well-known control hash the registrar is bound to
pub const REGISTRAR_HASH: &str =
    "sha256:c17dcddbc7b307ab652109d2c1a01fdd53890dffcbce3215da41d8104e551b0b";

/// Registrar op: bind a sub-hash to the registering connection
pub const OP_ADD: &str = "a";

/// Line terminator
pub const NEWLINE: u8 = b'\n';

/// Token separator in registrar commands
pub const COMMAND_SEPARATOR: char = ' ';

/// Default port for the dispatch server
pub const DEFAULT_PORT: u16 = 10842;
