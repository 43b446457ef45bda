pub mod guard;
pub mod login;

pub use guard::RequireAdmin;
pub use login::login;
