pub mod random;

pub use random::{RandomMoveSelector, choose_preferring_captures};
