pub mod fetch;
pub mod keys;
pub mod model;
pub mod output;
pub mod rows;
