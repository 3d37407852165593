pub mod cache;
pub mod view;

pub use cache::ViewCache;
pub use view::view;
