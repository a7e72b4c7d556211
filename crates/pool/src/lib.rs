mod draw;
mod errors;
mod leaf;
mod pool;
mod position;
mod seed;
mod slots;
mod trie;

pub use draw::*;
pub use errors::*;
pub use leaf::*;
pub use pool::*;
pub use position::*;
pub use seed::*;
pub use slots::*;
pub use trie::*;
