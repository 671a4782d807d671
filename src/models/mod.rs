pub mod drive;
pub mod slides;
