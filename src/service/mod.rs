pub mod admin_service;
pub mod chat_service;
pub mod error;
pub mod listing_service;
pub mod report_service;
pub mod verification_service;

#[cfg(test)]
pub mod test_support;
