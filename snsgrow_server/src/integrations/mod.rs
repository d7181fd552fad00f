pub mod smmturk;
