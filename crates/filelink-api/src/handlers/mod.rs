pub mod file_download;
pub mod health;
pub mod status;
pub mod watch;
