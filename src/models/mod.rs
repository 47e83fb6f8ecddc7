pub mod todo;
pub mod user;

pub use todo::{Todo, TodoInput, TodoPatch, TodoQuery};
pub use user::{normalize_key, NewUser, User};
