pub mod parameter_reader;
