mod common;
mod extraction_tests;
mod lookup_tests;
