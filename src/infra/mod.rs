pub mod theoddsapi;
