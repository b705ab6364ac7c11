pub mod jar;
pub mod printer;
pub mod storage;

pub use jar::CookieJar;
pub use storage::{CookieStore, FileCookieStore, MemoryCookieStore};
