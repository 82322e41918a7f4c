pub mod raw_message;
