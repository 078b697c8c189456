pub mod file_object_store;
