mod episode;

pub use episode::*;
