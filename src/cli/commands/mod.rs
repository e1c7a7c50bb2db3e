pub mod config;
pub mod db;
pub mod device;
pub mod init;
pub mod log;
pub mod login;
pub mod logout;
pub mod punch;
pub mod report;
pub mod run;
pub mod sync;
pub mod tick;
pub mod today;
