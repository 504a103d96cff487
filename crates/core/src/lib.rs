pub mod config;
pub mod driver;
pub mod frequency_table;
pub mod reporter;
pub mod ring_buffer;
pub mod window_counter;
