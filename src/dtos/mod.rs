pub mod chatdtos;
pub mod listingdtos;
pub mod reportdtos;
pub mod userdtos;
pub mod verificationdtos;
