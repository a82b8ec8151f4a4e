pub mod bucket;
pub mod file_exist;
pub mod regex;
pub mod url;
