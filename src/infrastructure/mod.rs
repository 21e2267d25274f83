pub mod google;
pub mod storage;
