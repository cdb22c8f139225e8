pub mod tricks;
