pub mod interpret;
