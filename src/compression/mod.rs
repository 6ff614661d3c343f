//! Decompression of strip and tile payloads
//!
//! Each supported TIFF compression code maps to a `CompressionHandler`
//! created by `CompressionFactory`.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
