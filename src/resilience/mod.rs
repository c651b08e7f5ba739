pub mod reauth;
pub mod retry;
