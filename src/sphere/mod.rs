pub mod nvector;
