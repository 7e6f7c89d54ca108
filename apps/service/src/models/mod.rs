pub mod token;
pub mod user;

pub use token::Token;
pub use user::User;
