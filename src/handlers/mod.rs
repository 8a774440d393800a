// Handlers grouped by security tier:
// Public (no auth) → Protected (bearer token) → Elevated (ADMIN role)
pub mod elevated;
pub mod protected;
pub mod public;
