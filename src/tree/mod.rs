pub mod persistent_set;
