//! Cursor-based AMQP 1.0 typed data stream.
//!
//! A [`Data`] stream holds a tree of typed nodes (atoms, lists, maps) and a
//! single read/write cursor:
//! - `next`/`prev` move among siblings, `enter`/`exit` move into and out of containers
//! - typed `get_*` accessors read the node under the cursor
//! - typed `put_*` writers place a node after the cursor
//!
//! [`codec`] converts streams to and from the AMQP 1.0 primitive encoding.

pub mod atom;
pub mod codec;
pub mod constructor;
pub mod data;
pub mod error;

pub use atom::{Atom, DataType, Node};
pub use codec::{
    decode_data, decode_data_with_config, decode_node, decode_node_with_config, encode_data,
    encode_node, skip_node, skip_node_with_config, DataConfig, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_ENCODED_SIZE,
};
pub use data::{Data, Rewound};
pub use error::{DataError, Result};
