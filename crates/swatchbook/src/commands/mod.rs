pub mod catalog;
pub mod init;
pub mod preview;
pub mod serve;
