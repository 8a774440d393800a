// Endpoints that additionally require the ADMIN role
pub mod users;
