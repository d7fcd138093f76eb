//! Low-level source cursor and byte-classification primitives shared by
//! `ecmac_lexer`. Kept separate from the token-producing lexer so the
//! scanning primitives can be unit tested in isolation, mirroring the
//! teacher's split between raw scanning and the token-aware lexer.

mod cursor;
pub mod raw_scanner;
mod source_buffer;

pub use cursor::Cursor;
pub use source_buffer::SourceBuffer;
