pub mod image_utils;
pub mod password;
pub mod token;
