pub mod categories;
pub mod checks;
pub mod handlers;
pub mod routes;
pub mod search;
pub mod settings;
pub mod shows;

pub use routes::create_router;
