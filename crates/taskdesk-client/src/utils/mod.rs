pub mod error_utils;
