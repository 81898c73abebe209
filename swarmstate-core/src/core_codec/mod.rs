/*
    core_codec - Binary wire and dump encoding

    Everything that crosses the persistence or swarm boundary is encoded here:
    - Ordered-key dictionaries, byte strings, integers and lists (bencode)
    - Streaming dict consumption with an unknown-key passthrough bucket
    - Size-bounded compression with a self-describing marker byte
*/

pub mod compress;
pub mod decode;
pub mod encode;
pub mod errors;
pub mod value;

pub use compress::{compress, decompress, CompressionError, Compressor, COMPRESSION_MARKER};
pub use decode::{decode, DictConsumer};
pub use encode::{encode, DictBuilder};
pub use errors::{CodecError, CodecResult};
pub use value::{Dict, RawValue, Unknowns, Value};
