pub mod title_cache;
