mod isbn;

pub use isbn::Isbn;
