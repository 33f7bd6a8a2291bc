pub mod chatmodels;
pub mod listingmodel;
pub mod reportmodel;
pub mod usermodel;
pub mod verificationmodels;
