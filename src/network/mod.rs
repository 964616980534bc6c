mod graph;
mod load;
mod parse;

pub use graph::{AuthorNetwork, AuthorRecord};
pub use load::load_author_network;
